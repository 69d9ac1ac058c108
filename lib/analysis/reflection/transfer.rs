//! The transfer function: how one instruction changes an `Environment`.

use crate::analysis::options::Options;
use crate::analysis::reflection::{AbstractValue, Environment};
use crate::ir::*;
use log::trace;

const JAVA_LANG_CLASS: &str = "Ljava/lang/Class;";

/// Callees which return their first argument.
///
/// The argument's value passes through when its runtime type fits the
/// declared return type.
const IDENTITY_METHODS: &[(&str, &str, &str)] = &[
    (
        "Ljava/lang/String;",
        "toString",
        "()Ljava/lang/String;",
    ),
    ("Ljava/lang/String;", "intern", "()Ljava/lang/String;"),
    (
        "Ljava/lang/String;",
        "valueOf",
        "(Ljava/lang/Object;)Ljava/lang/String;",
    ),
    (
        "Ljava/util/Objects;",
        "requireNonNull",
        "(Ljava/lang/Object;)Ljava/lang/Object;",
    ),
];

/// The read-only data the transfer function consults.
#[derive(Clone, Copy, Debug)]
pub struct TransferContext<'a> {
    hierarchy: &'a ClassHierarchy,
    options: &'a Options,
}

impl<'a> TransferContext<'a> {
    pub fn new(hierarchy: &'a ClassHierarchy, options: &'a Options) -> TransferContext<'a> {
        TransferContext { hierarchy, options }
    }

    pub fn hierarchy(&self) -> &ClassHierarchy {
        self.hierarchy
    }

    pub fn options(&self) -> &Options {
        self.options
    }
}

/// How an opcode affects the environment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Category {
    ConstString,
    ConstClass,
    Move,
    MoveResult,
    NewObject,
    Invoke,
    FieldGet,
    CheckCast,
    /// Writes nothing the analysis tracks.
    NoDestination,
    /// Writes a value the analysis knows nothing about.
    Opaque,
}

fn category(opcode: Opcode) -> Category {
    match opcode {
        Opcode::ConstString => Category::ConstString,
        Opcode::ConstClass => Category::ConstClass,
        Opcode::Move | Opcode::MoveObject | Opcode::MoveWide => Category::Move,
        Opcode::MoveResult | Opcode::MoveResultObject | Opcode::MoveResultWide => {
            Category::MoveResult
        }
        Opcode::NewInstance | Opcode::NewArray | Opcode::FilledNewArray => Category::NewObject,
        Opcode::InvokeVirtual
        | Opcode::InvokeSuper
        | Opcode::InvokeDirect
        | Opcode::InvokeStatic
        | Opcode::InvokeInterface => Category::Invoke,
        Opcode::Iget | Opcode::IgetObject | Opcode::Sget | Opcode::SgetObject => {
            Category::FieldGet
        }
        Opcode::CheckCast => Category::CheckCast,
        Opcode::Nop
        | Opcode::ReturnVoid
        | Opcode::Return
        | Opcode::ReturnWide
        | Opcode::ReturnObject
        | Opcode::MonitorEnter
        | Opcode::MonitorExit
        | Opcode::Throw
        | Opcode::Goto
        | Opcode::Switch
        | Opcode::If
        | Opcode::IfZero
        | Opcode::Aput
        | Opcode::AputWide
        | Opcode::AputObject
        | Opcode::Iput
        | Opcode::IputObject
        | Opcode::Sput
        | Opcode::SputObject => Category::NoDestination,
        Opcode::MoveException
        | Opcode::Const
        | Opcode::ConstWide
        | Opcode::InstanceOf
        | Opcode::ArrayLength
        | Opcode::Aget
        | Opcode::AgetWide
        | Opcode::AgetObject
        | Opcode::Unop
        | Opcode::UnopWide
        | Opcode::Binop
        | Opcode::BinopWide => Category::Opaque,
    }
}

/// `ObjectOfType` for references, `Top` for primitives.
fn of_type(dex_type: &DexType) -> AbstractValue {
    if dex_type.is_reference() {
        AbstractValue::ObjectOfType(dex_type.clone())
    } else {
        AbstractValue::Top
    }
}

fn source(instruction: &Instruction, index: usize, environment: &Environment) -> AbstractValue {
    instruction
        .src(index)
        .map(|register| environment.get(register))
        .unwrap_or(AbstractValue::Top)
}

/// True if the instruction writes a register pair.
fn writes_wide(instruction: &Instruction) -> bool {
    match instruction.opcode() {
        Opcode::MoveWide
        | Opcode::MoveResultWide
        | Opcode::ConstWide
        | Opcode::AgetWide
        | Opcode::UnopWide
        | Opcode::BinopWide => true,
        Opcode::Iget | Opcode::Sget => instruction
            .field()
            .map(|field| field.field_type().is_wide())
            .unwrap_or(false),
        _ => false,
    }
}

/// The value of an instruction, for instructions which write one.
fn evaluate(
    instruction: &Instruction,
    environment: &Environment,
    context: &TransferContext,
) -> AbstractValue {
    match category(instruction.opcode()) {
        Category::ConstString => match instruction.string() {
            Some(string) => AbstractValue::string(string),
            None => AbstractValue::Top,
        },
        Category::ConstClass => match instruction.dex_type() {
            Some(dex_type) => AbstractValue::ClassObject(dex_type.clone()),
            None => AbstractValue::Top,
        },
        Category::Move => source(instruction, 0, environment),
        Category::MoveResult => environment.get(Register::RESULT),
        Category::NewObject => instruction
            .dex_type()
            .map(of_type)
            .unwrap_or(AbstractValue::Top),
        Category::Invoke => match instruction.method() {
            Some(method) => invoke(instruction, method, environment, context),
            None => AbstractValue::Top,
        },
        Category::FieldGet => instruction
            .field()
            .map(|field| of_type(field.field_type()))
            .unwrap_or(AbstractValue::Top),
        Category::CheckCast => {
            let value = source(instruction, 0, environment);
            if value.is_exact() {
                value
            } else {
                instruction
                    .dex_type()
                    .map(of_type)
                    .unwrap_or(AbstractValue::Top)
            }
        }
        Category::NoDestination | Category::Opaque => AbstractValue::Top,
    }
}

/// Apply one instruction to an environment.
pub fn transfer(
    instruction: &Instruction,
    environment: &Environment,
    context: &TransferContext,
) -> Environment {
    if environment.is_bottom() {
        return environment.clone();
    }

    let category = category(instruction.opcode());
    if category == Category::NoDestination {
        return environment.clone();
    }

    let destination = if instruction.opcode().writes_result() {
        Register::RESULT
    } else {
        match instruction.dest() {
            Some(destination) => destination,
            None => return environment.clone(),
        }
    };

    let value = evaluate(instruction, environment, context);
    let mut environment = environment.clone();
    if writes_wide(instruction) && !destination.is_result() {
        // the upper half of a wide pair is no longer what it was
        environment.bind(Register::new(destination.number() + 1), AbstractValue::Top);
    }
    environment.bind(destination, value);
    environment
}

/// Apply every instruction of a block, in order.
pub fn transfer_block(
    block: &Block,
    environment: &Environment,
    context: &TransferContext,
) -> Environment {
    block
        .instructions()
        .iter()
        .fold(environment.clone(), |environment, instruction| {
            transfer(instruction, &environment, context)
        })
}

fn is_identity(method: &MethodRef, context: &TransferContext) -> bool {
    IDENTITY_METHODS
        .iter()
        .any(|(owner, name, signature)| method.matches(owner, name, signature))
        || context.options().identity_methods().contains(method)
}

/// The value `RESULT` holds after an invoke.
fn invoke(
    instruction: &Instruction,
    method: &MethodRef,
    environment: &Environment,
    context: &TransferContext,
) -> AbstractValue {
    let return_type = method.return_type();
    if return_type.is_void() {
        return AbstractValue::Top;
    }
    let default = of_type(return_type);

    if is_identity(method, context) {
        let argument = source(instruction, 0, environment);
        let fits = argument
            .runtime_type()
            .map(|runtime_type| {
                return_type == &DexType::java_lang_object()
                    || context.hierarchy().is_subclass(&runtime_type, return_type)
            })
            .unwrap_or(false);
        if fits {
            return argument;
        }
        return default;
    }

    if context.options().resolve_reflection() {
        if let Some(value) = reflection_intrinsic(instruction, method, environment, context) {
            trace!("{} resolves to {}", instruction, value);
            return value;
        }
    }

    default
}

/// Evaluates calls into the reflection API whose inputs are known.
///
/// Returns `None` when the callee is not one of the modeled methods or its
/// inputs are not precise enough.
fn reflection_intrinsic(
    instruction: &Instruction,
    method: &MethodRef,
    environment: &Environment,
    context: &TransferContext,
) -> Option<AbstractValue> {
    let owner = method.owner().descriptor();
    let name = method.name();
    let parameters = method.proto().parameters();

    if name == "getClass"
        && parameters.is_empty()
        && method.return_type().descriptor() == JAVA_LANG_CLASS
    {
        let receiver = source(instruction, 0, environment);
        return match receiver {
            AbstractValue::ObjectOfType(ref dex_type) if context.hierarchy().is_final(dex_type) => {
                Some(AbstractValue::ClassObject(dex_type.clone()))
            }
            _ if receiver.is_exact() => receiver.runtime_type().map(AbstractValue::ClassObject),
            _ => None,
        };
    }

    if owner != JAVA_LANG_CLASS {
        return None;
    }

    match name {
        "forName" if parameters.first() == Some(&DexType::java_lang_string()) => {
            let class_name = source(instruction, 0, environment);
            class_name
                .string_literal()
                .and_then(DexType::from_java_name)
                .map(AbstractValue::ClassObject)
        }
        "getField" | "getDeclaredField" | "getMethod" | "getDeclaredMethod"
            if parameters.first() == Some(&DexType::java_lang_string()) =>
        {
            let class = source(instruction, 0, environment);
            let member = source(instruction, 1, environment);
            let owner = match class {
                AbstractValue::ClassObject(ref dex_type) => dex_type.clone(),
                _ => return None,
            };
            let member = member.string_literal()?;
            if name.ends_with("Field") {
                Some(AbstractValue::field(owner, member))
            } else {
                Some(AbstractValue::method(owner, member))
            }
        }
        "getName" if parameters.is_empty() => match source(instruction, 0, environment) {
            AbstractValue::ClassObject(ref dex_type) => {
                Some(AbstractValue::string(dex_type.java_name()))
            }
            _ => None,
        },
        _ => None,
    }
}
