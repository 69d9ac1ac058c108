use crate::analysis::reflection::{AbstractValue, SimpleReflectionAnalysis};
use crate::analysis::OptionsBuilder;
use crate::ir::*;
use crate::Error;


fn static_method(return_type: &str, registers_size: u32, code: Option<ControlFlowGraph>) -> Method {
    Method::new(
        MethodRef::new("LTest;", "test", Proto::new(return_type, vec![])),
        AccessFlags::STATIC,
        registers_size,
        code,
    )
}

fn class_method(name: &str, parameters: Vec<DexType>, return_type: &str) -> MethodRef {
    MethodRef::new("Ljava/lang/Class;", name, Proto::new(return_type, parameters))
}

/// The point of the instruction following `position`, where the effects of
/// the instruction at `position` are visible.
fn after(block: usize, position: usize) -> ProgramPoint {
    ProgramPoint::new(block, position + 1)
}

#[test]
fn single_definition_propagates() {
    let mut control_flow_graph = ControlFlowGraph::new();
    let (first, second) = {
        let block = control_flow_graph.new_block().unwrap();
        block.const_string(reg(0), "foo1");
        block.goto();
        let first = block.index();
        let block = control_flow_graph.new_block().unwrap();
        block.move_object(reg(1), reg(0));
        block.return_object(reg(1));
        (first, block.index())
    };
    control_flow_graph.goto_edge(first, second).unwrap();
    control_flow_graph.set_entry(first).unwrap();

    let method = static_method("Ljava/lang/String;", 2, Some(control_flow_graph));
    let analysis = SimpleReflectionAnalysis::new(&method, &ClassHierarchy::new()).unwrap();

    for point in &[
        ProgramPoint::new(first, 1),
        ProgramPoint::new(second, 0),
        ProgramPoint::new(second, 1),
    ] {
        assert_eq!(
            analysis.get_abstract_object(reg(0), *point),
            Some(&AbstractValue::string("foo1"))
        );
    }
    assert_eq!(
        analysis.get_abstract_object(reg(1), ProgramPoint::new(second, 1)),
        Some(&AbstractValue::string("foo1"))
    );
}

#[test]
fn branch_merge() {
    // 0 -> {1, 2} -> 3
    let mut control_flow_graph = ControlFlowGraph::new();
    let head = {
        let block = control_flow_graph.new_block().unwrap();
        block.const_literal(reg(2), 0);
        block.if_zero(reg(2));
        block.index()
    };
    let then = {
        let block = control_flow_graph.new_block().unwrap();
        block.const_string(reg(0), "foo1");
        block.const_string(reg(1), "same");
        block.index()
    };
    let otherwise = {
        let block = control_flow_graph.new_block().unwrap();
        block.const_string(reg(0), "foo2");
        block.const_string(reg(1), "same");
        block.index()
    };
    let merge = {
        let block = control_flow_graph.new_block().unwrap();
        block.return_void();
        block.index()
    };
    control_flow_graph.branch_edge(head, then).unwrap();
    control_flow_graph.fallthrough_edge(head, otherwise).unwrap();
    control_flow_graph.goto_edge(then, merge).unwrap();
    control_flow_graph.goto_edge(otherwise, merge).unwrap();
    control_flow_graph.set_entry(head).unwrap();

    let method = static_method("V", 3, Some(control_flow_graph));
    let analysis = SimpleReflectionAnalysis::new(&method, &ClassHierarchy::new()).unwrap();
    let point = ProgramPoint::new(merge, 0);

    assert_eq!(
        analysis.get_abstract_object(reg(0), point),
        Some(&AbstractValue::object("Ljava/lang/String;"))
    );
    assert_eq!(
        analysis.get_abstract_object(reg(1), point),
        Some(&AbstractValue::string("same"))
    );
    assert_eq!(
        analysis.get_abstract_object(reg(2), point),
        Some(&AbstractValue::Top)
    );
}

#[test]
fn catch_handlers_see_the_try_block() {
    let mut control_flow_graph = ControlFlowGraph::new();
    let try_block = {
        let block = control_flow_graph.new_block().unwrap();
        block.const_string(reg(0), "foo");
        block.invoke_static(
            MethodRef::new("LTest;", "mayThrow", Proto::new("V", vec![])),
            vec![],
        );
        block.index()
    };
    let normal = control_flow_graph.new_block().unwrap().index();
    let handler = {
        let block = control_flow_graph.new_block().unwrap();
        block.move_exception(reg(1));
        block.return_object(reg(0));
        block.index()
    };
    control_flow_graph.goto_edge(try_block, normal).unwrap();
    control_flow_graph.exception_edge(try_block, handler).unwrap();
    control_flow_graph.set_entry(try_block).unwrap();

    control_flow_graph
        .block_mut(normal)
        .unwrap()
        .return_object(reg(0));

    let kinds = control_flow_graph
        .edges_out(try_block)
        .unwrap()
        .iter()
        .map(|edge| edge.kind())
        .collect::<Vec<EdgeKind>>();
    assert_eq!(kinds, vec![EdgeKind::Goto, EdgeKind::Exception]);
    let handler_edges = control_flow_graph.edges_in(handler).unwrap();
    assert_eq!(handler_edges.len(), 1);
    assert_eq!(handler_edges[0].head(), try_block);

    let method = static_method("Ljava/lang/String;", 2, Some(control_flow_graph));
    let analysis = SimpleReflectionAnalysis::new(&method, &ClassHierarchy::new()).unwrap();

    assert_eq!(
        analysis.get_abstract_object(reg(0), ProgramPoint::new(normal, 0)),
        Some(&AbstractValue::string("foo"))
    );
    assert_eq!(
        analysis.get_abstract_object(reg(0), after(handler, 0)),
        Some(&AbstractValue::string("foo"))
    );
    assert_eq!(
        analysis.get_abstract_object(reg(1), after(handler, 0)),
        Some(&AbstractValue::Top)
    );
}

#[test]
fn unreachable_and_unknown_points() {
    let mut control_flow_graph = ControlFlowGraph::new();
    let entry = {
        let block = control_flow_graph.new_block().unwrap();
        block.const_string(reg(0), "foo");
        block.return_object(reg(0));
        block.index()
    };
    let dead = {
        let block = control_flow_graph.new_block().unwrap();
        block.const_string(reg(0), "dead");
        block.return_object(reg(0));
        block.index()
    };
    control_flow_graph.set_entry(entry).unwrap();

    let method = static_method("Ljava/lang/String;", 1, Some(control_flow_graph));
    let analysis = SimpleReflectionAnalysis::new(&method, &ClassHierarchy::new()).unwrap();

    // no path reaches the dead block
    assert_eq!(
        analysis.get_abstract_object(reg(0), ProgramPoint::new(dead, 1)),
        None
    );
    assert!(analysis
        .environment(ProgramPoint::new(dead, 1))
        .unwrap()
        .is_bottom());

    // not an instruction of the method
    assert_eq!(
        analysis.get_abstract_object(reg(0), ProgramPoint::new(entry, 7)),
        None
    );
    assert_eq!(
        analysis.get_abstract_object(reg(0), ProgramPoint::new(42, 0)),
        None
    );
}

#[test]
fn methods_without_code() {
    let method = static_method("V", 0, None);
    let analysis = SimpleReflectionAnalysis::new(&method, &ClassHierarchy::new()).unwrap();

    assert!(analysis.is_empty());
    assert_eq!(
        analysis.get_abstract_object(reg(0), ProgramPoint::new(0, 0)),
        None
    );

    let method = static_method("V", 0, Some(ControlFlowGraph::new()));
    assert!(SimpleReflectionAnalysis::new(&method, &ClassHierarchy::new())
        .unwrap()
        .is_empty());
}

#[test]
fn code_without_entry() {
    let mut control_flow_graph = ControlFlowGraph::new();
    control_flow_graph.new_block().unwrap().return_void();
    let method = static_method("V", 0, Some(control_flow_graph));

    assert!(matches!(
        SimpleReflectionAnalysis::new(&method, &ClassHierarchy::new()),
        Err(Error::ControlFlowGraphEntryNotFound)
    ));
}

#[test]
fn determinism() {
    let method = isolate::isolate_main();
    let hierarchy = ClassHierarchy::with_java_lang();
    let first = SimpleReflectionAnalysis::new(&method, &hierarchy).unwrap();
    let second = SimpleReflectionAnalysis::new(&method, &hierarchy).unwrap();

    assert_eq!(first.iterations(), second.iterations());
    for (point, _) in method.instructions() {
        for register in method.registers().chain(Some(Register::RESULT)) {
            assert_eq!(
                first.get_abstract_object(register, point),
                second.get_abstract_object(register, point)
            );
        }
    }
}

#[test]
fn exhausted_budget_is_sound() {
    // 0 -> 1 <-> 2, 1 -> 3, with v0 changing in the loop
    let mut control_flow_graph = ControlFlowGraph::new();
    let entry = {
        let block = control_flow_graph.new_block().unwrap();
        block.const_string(reg(0), "before");
        block.const_literal(reg(1), 0);
        block.index()
    };
    let loop_head = {
        let block = control_flow_graph.new_block().unwrap();
        block.if_zero(reg(1));
        block.index()
    };
    let loop_body = {
        let block = control_flow_graph.new_block().unwrap();
        block.const_string(reg(0), "inside");
        block.goto();
        block.index()
    };
    let exit = {
        let block = control_flow_graph.new_block().unwrap();
        block.return_object(reg(0));
        block.index()
    };
    control_flow_graph.goto_edge(entry, loop_head).unwrap();
    control_flow_graph.branch_edge(loop_head, loop_body).unwrap();
    control_flow_graph.fallthrough_edge(loop_head, exit).unwrap();
    control_flow_graph.goto_edge(loop_body, loop_head).unwrap();
    control_flow_graph.set_entry(entry).unwrap();

    let method = static_method("Ljava/lang/String;", 2, Some(control_flow_graph));
    let hierarchy = ClassHierarchy::new();

    let analysis = SimpleReflectionAnalysis::new(&method, &hierarchy).unwrap();
    assert!(analysis.converged());
    assert_eq!(
        analysis.get_abstract_object(reg(0), ProgramPoint::new(exit, 0)),
        Some(&AbstractValue::object("Ljava/lang/String;"))
    );

    // one visit per block is not enough to go around the loop
    let options = OptionsBuilder::new().max_block_visits(1).build();
    let analysis = SimpleReflectionAnalysis::with_options(&method, &hierarchy, &options).unwrap();
    assert!(!analysis.converged());
    assert_eq!(analysis.iterations(), 4);
    assert_eq!(
        analysis.get_abstract_object(reg(0), ProgramPoint::new(exit, 0)),
        Some(&AbstractValue::Top)
    );
    assert_eq!(
        analysis.get_abstract_object(reg(0), ProgramPoint::new(loop_head, 0)),
        Some(&AbstractValue::Top)
    );
    // the entry block finished before the budget ran out
    assert_eq!(
        analysis.get_abstract_object(reg(0), after(entry, 0)),
        Some(&AbstractValue::string("before"))
    );
}

#[test]
fn reflection_intrinsics() {
    let mut control_flow_graph = ControlFlowGraph::new();
    let class_array = DexType::new("[Ljava/lang/Class;");
    let entry = {
        let block = control_flow_graph.new_block().unwrap();
        // 0
        block.const_string(reg(0), "java.lang.String");
        // 1, 2
        block.invoke_static(
            class_method("forName", vec![DexType::java_lang_string()], "Ljava/lang/Class;"),
            vec![reg(0)],
        );
        block.move_result_object(reg(1));
        // 3, 4, 5
        block.const_string(reg(2), "valueOf");
        block.invoke_virtual(
            class_method(
                "getDeclaredMethod",
                vec![DexType::java_lang_string(), class_array],
                "Ljava/lang/reflect/Method;",
            ),
            vec![reg(1), reg(2), reg(5)],
        );
        block.move_result_object(reg(3));
        // 6, 7, 8
        block.const_string(reg(2), "CASE_INSENSITIVE_ORDER");
        block.invoke_virtual(
            class_method(
                "getField",
                vec![DexType::java_lang_string()],
                "Ljava/lang/reflect/Field;",
            ),
            vec![reg(1), reg(2)],
        );
        block.move_result_object(reg(4));
        // 9, 10
        block.invoke_virtual(
            class_method("getName", vec![], "Ljava/lang/String;"),
            vec![reg(1)],
        );
        block.move_result_object(reg(5));
        // 11, 12
        block.invoke_virtual(
            MethodRef::new(
                "Ljava/lang/Object;",
                "getClass",
                Proto::new("Ljava/lang/Class;", vec![]),
            ),
            vec![reg(0)],
        );
        block.move_result_object(reg(6));
        // 13, 14
        block.new_instance(reg(7), "LOpen;");
        block.invoke_virtual(
            MethodRef::new(
                "Ljava/lang/Object;",
                "getClass",
                Proto::new("Ljava/lang/Class;", vec![]),
            ),
            vec![reg(7)],
        );
        // 15
        block.move_result_object(reg(8));
        // 16
        block.return_void();
        block.index()
    };
    control_flow_graph.set_entry(entry).unwrap();

    let method = static_method("V", 9, Some(control_flow_graph));
    let mut hierarchy = ClassHierarchy::with_java_lang();
    hierarchy.declare("LOpen;", Some(DexType::java_lang_object()), AccessFlags::PUBLIC);

    let analysis = SimpleReflectionAnalysis::new(&method, &hierarchy).unwrap();
    let value = |register: u32, position: usize| {
        analysis
            .get_abstract_object(reg(register), after(entry, position))
            .map(|value| value.to_string())
    };

    assert_eq!(value(1, 2), Some("CLASS{Ljava/lang/String;}".to_string()));
    assert_eq!(
        value(3, 5),
        Some("METHOD{Ljava/lang/String;:valueOf}".to_string())
    );
    assert_eq!(
        value(4, 8),
        Some("FIELD{Ljava/lang/String;:CASE_INSENSITIVE_ORDER}".to_string())
    );
    assert_eq!(value(5, 10), Some("\"java.lang.String\"".to_string()));
    assert_eq!(value(6, 12), Some("CLASS{Ljava/lang/String;}".to_string()));
    // LOpen; may be subclassed, so its class is not known
    assert_eq!(value(8, 15), Some("OBJECT{Ljava/lang/Class;}".to_string()));

    let options = OptionsBuilder::new().resolve_reflection(false).build();
    let analysis = SimpleReflectionAnalysis::with_options(&method, &hierarchy, &options).unwrap();
    assert_eq!(
        analysis.get_abstract_object(reg(1), after(entry, 2)),
        Some(&AbstractValue::object("Ljava/lang/Class;"))
    );
}

#[test]
fn unresolvable_reflection_degrades() {
    let mut control_flow_graph = ControlFlowGraph::new();
    let entry = {
        let block = control_flow_graph.new_block().unwrap();
        block.invoke_static(
            MethodRef::new("LTest;", "name", Proto::new("Ljava/lang/String;", vec![])),
            vec![],
        );
        block.move_result_object(reg(0));
        block.invoke_static(
            class_method("forName", vec![DexType::java_lang_string()], "Ljava/lang/Class;"),
            vec![reg(0)],
        );
        block.move_result_object(reg(1));
        block.const_string(reg(2), "not a class name");
        block.invoke_static(
            class_method("forName", vec![DexType::java_lang_string()], "Ljava/lang/Class;"),
            vec![reg(2)],
        );
        block.move_result_object(reg(3));
        block.return_void();
        block.index()
    };
    control_flow_graph.set_entry(entry).unwrap();

    let method = static_method("V", 4, Some(control_flow_graph));
    let analysis = SimpleReflectionAnalysis::new(&method, &ClassHierarchy::new()).unwrap();
    let point = ProgramPoint::new(entry, 7);

    assert_eq!(
        analysis.get_abstract_object(reg(1), point),
        Some(&AbstractValue::object("Ljava/lang/Class;"))
    );
    assert_eq!(
        analysis.get_abstract_object(reg(3), point),
        Some(&AbstractValue::object("Ljava/lang/Class;"))
    );
}

#[test]
fn instance_parameters() {
    let mut control_flow_graph = ControlFlowGraph::new();
    let entry = {
        let block = control_flow_graph.new_block().unwrap();
        block.return_void();
        block.index()
    };
    control_flow_graph.set_entry(entry).unwrap();

    let method = Method::new(
        MethodRef::new(
            "LTest;",
            "run",
            Proto::new("V", vec![DexType::new("I"), DexType::java_lang_string()]),
        ),
        AccessFlags::PUBLIC,
        4,
        Some(control_flow_graph),
    );
    let analysis = SimpleReflectionAnalysis::new(&method, &ClassHierarchy::new()).unwrap();
    let point = ProgramPoint::new(entry, 0);

    assert_eq!(analysis.get_abstract_object(reg(0), point), None);
    assert_eq!(
        analysis.get_abstract_object(reg(1), point),
        Some(&AbstractValue::object("LTest;"))
    );
    assert_eq!(
        analysis.get_abstract_object(reg(2), point),
        Some(&AbstractValue::Top)
    );
    assert_eq!(
        analysis.get_abstract_object(reg(3), point),
        Some(&AbstractValue::object("Ljava/lang/String;"))
    );
}

#[test]
fn analysis_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SimpleReflectionAnalysis>();
}
