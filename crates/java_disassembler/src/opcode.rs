//! The opcode table: mnemonics, and how many operand bytes follow each opcode and what they mean.
//!
//! Switches and `wide` are only decoded far enough to know their length. They render a fixed
//! placeholder instead of their operands.

/// How the operand bytes of an instruction are laid out and interpreted
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperandShape {
    /// No operands
    None,
    /// One unsigned byte, like a local variable index
    OneByte,
    /// A signed 16 bit value
    OneShort,
    /// A signed 16 bit branch offset
    ShortBranchOffset,
    /// An 8 bit constant pool index of a loadable constant
    OneByteConstIndex,
    /// A 16 bit constant pool index of a loadable constant
    OneShortConstIndex,
    /// A 16 bit constant pool index of a field reference
    FieldRef { is_static: bool },
    /// A 16 bit constant pool index of a method reference
    MethodRef { is_static: bool },
    /// A 16 bit constant pool index of a class
    ClassRef,
    /// Two unsigned bytes, the index and increment of `iinc`
    TwoBytesPair,
    TableSwitch,
    LookupSwitch,
    /// A 16 bit index followed by two bytes, used by `invokeinterface` and `invokedynamic`
    MethodRefPlusTwoBytes,
    Wide,
    /// A 16 bit class index followed by a dimension count, used by `multianewarray`
    TwoByteClassPlusByte,
    /// A signed 32 bit branch offset
    OneInt32,
}

impl OperandShape {
    /// Looks up the shape of an opcode. Opcodes missing from the table take no operands.
    pub fn of(opcode: u8) -> Self {
        match opcode {
            0x10 | 0x15..=0x19 | 0x36..=0x3a | 0xa9 | 0xbc => OperandShape::OneByte,
            0x11 => OperandShape::OneShort,
            0x12 => OperandShape::OneByteConstIndex,
            0x13 | 0x14 => OperandShape::OneShortConstIndex,
            0x84 => OperandShape::TwoBytesPair,
            0x99..=0xa8 | 0xc6 | 0xc7 => OperandShape::ShortBranchOffset,
            0xaa => OperandShape::TableSwitch,
            0xab => OperandShape::LookupSwitch,
            0xb2 | 0xb3 => OperandShape::FieldRef { is_static: true },
            0xb4 | 0xb5 => OperandShape::FieldRef { is_static: false },
            0xb6 | 0xb7 => OperandShape::MethodRef { is_static: false },
            0xb8 => OperandShape::MethodRef { is_static: true },
            0xb9 | 0xba => OperandShape::MethodRefPlusTwoBytes,
            0xbb | 0xbd | 0xc0 | 0xc1 => OperandShape::ClassRef,
            0xc4 => OperandShape::Wide,
            0xc5 => OperandShape::TwoByteClassPlusByte,
            0xc8 | 0xc9 => OperandShape::OneInt32,
            _ => OperandShape::None,
        }
    }

    /// The number of operand bytes, `None` when it depends on the instruction's position and
    /// contents
    pub fn width(self) -> Option<usize> {
        let width = match self {
            OperandShape::None => 0,
            OperandShape::OneByte | OperandShape::OneByteConstIndex => 1,
            OperandShape::OneShort
            | OperandShape::ShortBranchOffset
            | OperandShape::OneShortConstIndex
            | OperandShape::FieldRef { .. }
            | OperandShape::MethodRef { .. }
            | OperandShape::ClassRef
            | OperandShape::TwoBytesPair => 2,
            OperandShape::TwoByteClassPlusByte => 3,
            OperandShape::MethodRefPlusTwoBytes | OperandShape::OneInt32 => 4,
            OperandShape::TableSwitch | OperandShape::LookupSwitch | OperandShape::Wide => {
                return None
            }
        };
        Some(width)
    }
}

/// The opcode that `wide` widens into a 4 byte instruction with an extra 16 bit increment
pub const IINC: u8 = 0x84;

/// The mnemonic of an opcode. Opcodes the jvm doesn't define are named `unknown`.
pub fn mnemonic(opcode: u8) -> &'static str {
    match opcode {
        0xca => "breakpoint",
        0xfe => "impdep1",
        0xff => "impdep2",
        _ => MNEMONICS.get(usize::from(opcode)).copied().unwrap_or("unknown"),
    }
}

static MNEMONICS: [&str; 0xca] = [
    "nop", "aconst_null", "iconst_m1", "iconst_0", "iconst_1", "iconst_2", "iconst_3",
    "iconst_4", "iconst_5", "lconst_0", "lconst_1", "fconst_0", "fconst_1", "fconst_2",
    "dconst_0", "dconst_1", "bipush", "sipush", "ldc", "ldc_w", "ldc2_w", "iload", "lload",
    "fload", "dload", "aload", "iload_0", "iload_1", "iload_2", "iload_3", "lload_0",
    "lload_1", "lload_2", "lload_3", "fload_0", "fload_1", "fload_2", "fload_3", "dload_0",
    "dload_1", "dload_2", "dload_3", "aload_0", "aload_1", "aload_2", "aload_3", "iaload",
    "laload", "faload", "daload", "aaload", "baload", "caload", "saload", "istore", "lstore",
    "fstore", "dstore", "astore", "istore_0", "istore_1", "istore_2", "istore_3", "lstore_0",
    "lstore_1", "lstore_2", "lstore_3", "fstore_0", "fstore_1", "fstore_2", "fstore_3",
    "dstore_0", "dstore_1", "dstore_2", "dstore_3", "astore_0", "astore_1", "astore_2",
    "astore_3", "iastore", "lastore", "fastore", "dastore", "aastore", "bastore", "castore",
    "sastore", "pop", "pop2", "dup", "dup_x1", "dup_x2", "dup2", "dup2_x1", "dup2_x2", "swap",
    "iadd", "ladd", "fadd", "dadd", "isub", "lsub", "fsub", "dsub", "imul", "lmul", "fmul",
    "dmul", "idiv", "ldiv", "fdiv", "ddiv", "irem", "lrem", "frem", "drem", "ineg", "lneg",
    "fneg", "dneg", "ishl", "lshl", "ishr", "lshr", "iushr", "lushr", "iand", "land", "ior",
    "lor", "ixor", "lxor", "iinc", "i2l", "i2f", "i2d", "l2i", "l2f", "l2d", "f2i", "f2l",
    "f2d", "d2i", "d2l", "d2f", "i2b", "i2c", "i2s", "lcmp", "fcmpl", "fcmpg", "dcmpl",
    "dcmpg", "ifeq", "ifne", "iflt", "ifge", "ifgt", "ifle", "if_icmpeq", "if_icmpne",
    "if_icmplt", "if_icmpge", "if_icmpgt", "if_icmple", "if_acmpeq", "if_acmpne", "goto",
    "jsr", "ret", "tableswitch", "lookupswitch", "ireturn", "lreturn", "freturn", "dreturn",
    "areturn", "return", "getstatic", "putstatic", "getfield", "putfield", "invokevirtual",
    "invokespecial", "invokestatic", "invokeinterface", "invokedynamic", "new", "newarray",
    "anewarray", "arraylength", "athrow", "checkcast", "instanceof", "monitorenter",
    "monitorexit", "wide", "multianewarray", "ifnull", "ifnonnull", "goto_w", "jsr_w",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonics_line_up_with_opcodes() {
        assert_eq!(mnemonic(0x00), "nop");
        assert_eq!(mnemonic(0x12), "ldc");
        assert_eq!(mnemonic(0x84), "iinc");
        assert_eq!(mnemonic(0xa7), "goto");
        assert_eq!(mnemonic(0xb1), "return");
        assert_eq!(mnemonic(0xb8), "invokestatic");
        assert_eq!(mnemonic(0xc8), "goto_w");
        assert_eq!(mnemonic(0xc9), "jsr_w");
        assert_eq!(mnemonic(0xca), "breakpoint");
        assert_eq!(mnemonic(0xcb), "unknown");
        assert_eq!(mnemonic(0xff), "impdep2");
    }

    #[test]
    fn operand_widths() {
        assert_eq!(OperandShape::of(0x12), OperandShape::OneByteConstIndex);
        assert_eq!(OperandShape::of(0x12).width(), Some(1));
        assert_eq!(OperandShape::of(0xc8), OperandShape::OneInt32);
        assert_eq!(OperandShape::of(0xc8).width(), Some(4));
        assert_eq!(OperandShape::of(0xb9).width(), Some(4));
        assert_eq!(OperandShape::of(0xc5).width(), Some(3));
        assert_eq!(OperandShape::of(0xaa).width(), None);
        assert_eq!(OperandShape::of(0xb1), OperandShape::None);
        assert_eq!(OperandShape::of(0xcb), OperandShape::None);
    }

    #[test]
    fn static_member_access() {
        assert_eq!(OperandShape::of(0xb2), OperandShape::FieldRef { is_static: true });
        assert_eq!(OperandShape::of(0xb4), OperandShape::FieldRef { is_static: false });
        assert_eq!(OperandShape::of(0xb8), OperandShape::MethodRef { is_static: true });
        assert_eq!(OperandShape::of(0xb7), OperandShape::MethodRef { is_static: false });
    }
}
