//! Walking a method's instruction stream, and rendering single instructions

use byteorder::{BigEndian, ReadBytesExt};

use crate::descriptor::{JavaType, MethodDescriptor};
use crate::error::{Error, ErrorKind};
use crate::model::{ConstantPool, ConstantPoolRef, Literal, MemberRef};
use crate::opcode::{self, OperandShape};
use crate::provider::TypeProvider;
use crate::resolver::Resolver;
use crate::styled::StyledDocument;

/// One decoded instruction: its opcode and every byte that belongs to it after the opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    offset: usize,
    opcode: u8,
    operands: &'a [u8],
}

impl<'a> Instruction<'a> {
    /// The offset of the opcode in the code
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn mnemonic(&self) -> &'static str {
        opcode::mnemonic(self.opcode)
    }

    pub fn shape(&self) -> OperandShape {
        OperandShape::of(self.opcode)
    }

    /// The bytes following the opcode
    pub fn operands(&self) -> &'a [u8] {
        self.operands
    }

    /// The offset of the instruction following this one
    pub fn next_offset(&self) -> usize {
        self.offset + 1 + self.operands.len()
    }

    fn operand_bytes(&self, at: usize) -> Result<&'a [u8], Error> {
        self.operands
            .get(at..)
            .ok_or_else(|| ErrorKind::truncated(self.offset).into())
    }

    /// Reads an unsigned byte `at` bytes after the opcode
    pub fn u8_at(&self, at: usize) -> Result<u8, Error> {
        self.operand_bytes(at)?
            .read_u8()
            .map_err(|_| ErrorKind::truncated(self.offset).into())
    }

    pub fn u16_at(&self, at: usize) -> Result<u16, Error> {
        self.operand_bytes(at)?
            .read_u16::<BigEndian>()
            .map_err(|_| ErrorKind::truncated(self.offset).into())
    }

    pub fn i16_at(&self, at: usize) -> Result<i16, Error> {
        self.operand_bytes(at)?
            .read_i16::<BigEndian>()
            .map_err(|_| ErrorKind::truncated(self.offset).into())
    }

    pub fn i32_at(&self, at: usize) -> Result<i32, Error> {
        self.operand_bytes(at)?
            .read_i32::<BigEndian>()
            .map_err(|_| ErrorKind::truncated(self.offset).into())
    }
}

/// Iterates over the instructions in some code. After the first error, the iterator is done.
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    code: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self {
            code,
            offset: 0,
            failed: false,
        }
    }

    fn read_i32(&self, at: usize) -> Result<i32, Error> {
        self.code
            .get(at..)
            .and_then(|mut bytes| bytes.read_i32::<BigEndian>().ok())
            .ok_or_else(|| ErrorKind::truncated(self.offset).into())
    }

    /// The number of operand bytes of the instruction at the current offset
    fn operand_length(&self, opcode: u8) -> Result<usize, Error> {
        let shape = OperandShape::of(opcode);
        if let Some(width) = shape.width() {
            return Ok(width);
        }
        let after_opcode = self.offset + 1;
        // switch operands start on the next multiple of 4
        let padding = (4 - after_opcode % 4) % 4;
        let table = after_opcode + padding;
        let length = match shape {
            OperandShape::TableSwitch => {
                let low = self.read_i32(table + 4)?;
                let high = self.read_i32(table + 8)?;
                if high < low {
                    return Err(self.malformed("tableswitch high is below low"));
                }
                let entries = (i64::from(high) - i64::from(low) + 1) as usize;
                padding + 12 + entries * 4
            }
            OperandShape::LookupSwitch => {
                let pairs = self.read_i32(table + 4)?;
                if pairs < 0 {
                    return Err(self.malformed("lookupswitch has a negative pair count"));
                }
                padding + 8 + pairs as usize * 8
            }
            OperandShape::Wide => match self.code.get(after_opcode) {
                Some(&opcode::IINC) => 5,
                Some(_) => 3,
                None => return Err(ErrorKind::truncated(self.offset).into()),
            },
            _ => 0,
        };
        Ok(length)
    }

    fn malformed(&self, reason: &'static str) -> Error {
        Error::new(ErrorKind::BytecodeDecode {
            offset: self.offset,
            reason,
        })
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let opcode = *self.code.get(self.offset)?;
        let decoded = self.operand_length(opcode).and_then(|length| {
            let start = self.offset + 1;
            self.code
                .get(start..start + length)
                .ok_or_else(|| ErrorKind::truncated(self.offset).into())
        });
        match decoded {
            Ok(operands) => {
                let instruction = Instruction {
                    offset: self.offset,
                    opcode,
                    operands,
                };
                self.offset = instruction.next_offset();
                Some(Ok(instruction))
            }
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}

/// Renders instructions of one method, resolving their constant pool operands
pub struct InstructionRenderer<'a, P> {
    resolver: &'a Resolver<P>,
    pool: &'a ConstantPool,
}

impl<'a, P: TypeProvider> InstructionRenderer<'a, P> {
    pub fn new(resolver: &'a Resolver<P>, pool: &'a ConstantPool) -> Self {
        Self { resolver, pool }
    }

    /// Renders the mnemonic, the operands and a closing `;`. Fails with
    /// [`BytecodeDecode`](ErrorKind::BytecodeDecode) if the operands can't be read, or
    /// with another kind if they don't point anywhere sensible.
    pub fn render(&self, doc: &mut StyledDocument, instruction: &Instruction) -> Result<(), Error> {
        doc.bytecode(instruction.mnemonic());
        match instruction.shape() {
            OperandShape::None => {}
            OperandShape::OneByte => {
                let value = instruction.u8_at(0)?;
                doc.argument(" ");
                doc.argument(value.to_string());
            }
            OperandShape::OneShort => {
                let value = instruction.i16_at(0)?;
                doc.argument(" ");
                doc.argument(value.to_string());
            }
            OperandShape::ShortBranchOffset => {
                let offset = instruction.i16_at(0)?;
                doc.argument(" $");
                doc.argument(offset.to_string());
            }
            OperandShape::OneByteConstIndex => {
                let index = instruction.u8_at(0)?;
                doc.argument(" ");
                self.write_constant(doc, u16::from(index));
            }
            OperandShape::OneShortConstIndex => {
                let index = instruction.u16_at(0)?;
                doc.argument(" ");
                self.write_constant(doc, index);
            }
            OperandShape::FieldRef { is_static } => {
                let index = instruction.u16_at(0)?;
                doc.argument(" ");
                self.write_field_ref(doc, index, is_static)?;
            }
            OperandShape::MethodRef { is_static } => {
                let index = instruction.u16_at(0)?;
                doc.argument(" ");
                self.write_method_ref(doc, index, is_static)?;
            }
            OperandShape::ClassRef => {
                let index = instruction.u16_at(0)?;
                doc.argument(" ");
                self.write_class_ref(doc, index)?;
            }
            OperandShape::TwoBytesPair => {
                let (index, increment) = (instruction.u8_at(0)?, instruction.u8_at(1)?);
                doc.argument(" ");
                doc.argument(index.to_string());
                doc.argument(", ");
                doc.argument(increment.to_string());
            }
            OperandShape::TableSwitch => doc.argument(" tableargs"),
            OperandShape::LookupSwitch => doc.argument(" lookupargs"),
            OperandShape::MethodRefPlusTwoBytes => {
                let index = instruction.i16_at(0)?;
                let (first, second) = (instruction.u8_at(2)?, instruction.u8_at(3)?);
                doc.argument(" ");
                doc.argument(index.to_string());
                doc.argument(", ");
                doc.argument(first.to_string());
                doc.argument(", ");
                doc.argument(second.to_string());
            }
            OperandShape::Wide => doc.argument(" wideargs"),
            OperandShape::TwoByteClassPlusByte => doc.argument(" 2b CP, 1b"),
            OperandShape::OneInt32 => {
                let offset = instruction.i32_at(0)?;
                doc.argument(" ");
                doc.argument(offset.to_string());
            }
        }
        doc.text(";");
        Ok(())
    }

    /// Strings are quoted, other literals shown as they are, anything else is `?`
    fn write_constant(&self, doc: &mut StyledDocument, index: u16) {
        match self.pool.get(index) {
            Some(ConstantPoolRef::Literal(Literal::String(string))) => {
                doc.argument("\"");
                doc.argument(string.as_str());
                doc.argument("\"");
            }
            Some(ConstantPoolRef::Literal(literal)) => doc.primitive(literal.to_string()),
            _ => doc.argument("?"),
        }
    }

    fn write_field_ref(&self, doc: &mut StyledDocument, index: u16, is_static: bool) -> Result<(), Error> {
        let field = match self.pool.get(index) {
            Some(ConstantPoolRef::Field(field)) => field,
            _ => return Err(invalid_ref(index, "field reference")),
        };
        let field_type: JavaType = field.descriptor.parse()?;
        self.write_member_name(doc, field, is_static);
        doc.text(" [");
        write_type(doc, self.resolver, &field_type);
        doc.text("]");
        Ok(())
    }

    fn write_method_ref(&self, doc: &mut StyledDocument, index: u16, is_static: bool) -> Result<(), Error> {
        let method = match self.pool.get(index) {
            Some(ConstantPoolRef::Method(method)) => method,
            _ => return Err(invalid_ref(index, "method reference")),
        };
        let descriptor: MethodDescriptor = method.descriptor.parse()?;
        self.write_member_name(doc, method, is_static);
        doc.text("(");
        for (i, parameter) in descriptor.parameters.iter().enumerate() {
            if i > 0 {
                doc.text(", ");
            }
            write_type(doc, self.resolver, parameter);
        }
        doc.text(") [");
        write_type(doc, self.resolver, &descriptor.return_type);
        doc.text("]");
        Ok(())
    }

    fn write_member_name(&self, doc: &mut StyledDocument, member: &MemberRef, is_static: bool) {
        doc.type_name(class_ref_name(self.resolver, &member.owner));
        doc.text(".");
        if is_static {
            doc.static_name(member.name.as_str());
        } else {
            doc.text(member.name.as_str());
        }
    }

    fn write_class_ref(&self, doc: &mut StyledDocument, index: u16) -> Result<(), Error> {
        match self.pool.get(index) {
            Some(ConstantPoolRef::Class(name)) => {
                doc.type_name(class_ref_name(self.resolver, name));
                Ok(())
            }
            _ => Err(invalid_ref(index, "class")),
        }
    }
}

fn invalid_ref(index: u16, expected: &'static str) -> Error {
    Error::new(ErrorKind::InvalidConstantPoolRef { index, expected })
}

/// The simple name of a class, or of an array class given as a descriptor (`String[]` for
/// `[Ljava/lang/String;`). `?` for anything that can't be resolved.
pub fn class_ref_name<P: TypeProvider>(resolver: &Resolver<P>, name: &str) -> String {
    if !name.starts_with('[') {
        return resolver.simple_name(name);
    }
    match name.parse::<JavaType>() {
        Ok(array) => {
            let (element, dimensions) = array.element();
            let element = match element {
                JavaType::Class(class) => resolver.simple_name(class),
                primitive => primitive.keyword().unwrap_or("?").to_string(),
            };
            format!("{}{}", element, "[]".repeat(dimensions))
        }
        Err(_) => "?".to_string(),
    }
}

/// Writes a type the way it would appear in source, with simple class names
pub fn write_type<P: TypeProvider>(doc: &mut StyledDocument, resolver: &Resolver<P>, java_type: &JavaType) {
    let (element, dimensions) = java_type.element();
    match element {
        JavaType::Void => doc.void("void"),
        JavaType::Class(name) => doc.type_name(resolver.simple_name(name)),
        primitive => doc.primitive(primitive.keyword().unwrap_or("?")),
    }
    for _ in 0..dimensions {
        doc.text("[]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;
    use crate::styled::OutputFormat;
    use pretty_assertions::assert_eq;

    fn decode(code: &[u8]) -> Vec<Result<(usize, usize), String>> {
        Instructions::new(code)
            .map(|result| {
                result
                    .map(|instruction| (instruction.offset(), instruction.next_offset() - instruction.offset()))
                    .map_err(|e| e.to_string())
            })
            .collect()
    }

    fn render(pool: &ConstantPool, code: &[u8]) -> Result<String, Error> {
        let resolver = Resolver::new(MemoryProvider::new());
        let renderer = InstructionRenderer::new(&resolver, pool);
        let mut doc = StyledDocument::new();
        for instruction in Instructions::new(code) {
            renderer.render(&mut doc, &instruction?)?;
            doc.text(" ");
        }
        Ok(doc.finish(OutputFormat::Plain).trim_end().to_string())
    }

    #[test]
    fn operand_widths_follow_the_table() {
        assert_eq!(decode(&[0x12, 0x05, 0xb1]), [Ok((0, 2)), Ok((2, 1))]);
        assert_eq!(decode(&[0xc8, 0xff, 0xff, 0xff, 0xfe, 0x00]), [Ok((0, 5)), Ok((5, 1))]);
    }

    #[test]
    fn truncated_code_stops_iteration() {
        let decoded = decode(&[0x00, 0x11, 0x01]);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0], Ok((0, 1)));
        assert!(decoded[1].is_err());
    }

    #[test]
    fn switches_are_padded() {
        // nop, then a tableswitch at offset 1 covering 0..=1, then return
        let mut code = vec![0x00, 0xaa, 0x00, 0x00];
        for value in [8, 0, 1, 20, 24] {
            code.extend_from_slice(&i32::to_be_bytes(value));
        }
        code.push(0xb1);
        assert_eq!(decode(&code), [Ok((0, 1)), Ok((1, 23)), Ok((24, 1))]);

        let mut code = vec![0xab, 0x00, 0x00, 0x00];
        for value in [12, 1, 5, 12] {
            code.extend_from_slice(&i32::to_be_bytes(value));
        }
        assert_eq!(decode(&code), [Ok((0, 20))]);
    }

    #[test]
    fn wide_length_depends_on_widened_opcode() {
        assert_eq!(
            decode(&[0xc4, 0x15, 0x01, 0x00, 0xc4, 0x84, 0x00, 0x01, 0x00, 0x02]),
            [Ok((0, 4)), Ok((4, 6))]
        );
    }

    #[test]
    fn renders_plain_operands() {
        let pool = ConstantPool::new();
        assert_eq!(render(&pool, &[0x10, 0xff]).unwrap(), "bipush 255;");
        assert_eq!(render(&pool, &[0x11, 0xff, 0xfe]).unwrap(), "sipush -2;");
        assert_eq!(render(&pool, &[0xa7, 0xff, 0xfd]).unwrap(), "goto $-3;");
        assert_eq!(render(&pool, &[0xc8, 0xff, 0xff, 0xff, 0xfe]).unwrap(), "goto_w -2;");
        assert_eq!(render(&pool, &[0x84, 0x01, 0x05]).unwrap(), "iinc 1, 5;");
        assert_eq!(render(&pool, &[0xb1]).unwrap(), "return;");
        assert_eq!(render(&pool, &[0xc5, 0x00, 0x01, 0x02]).unwrap(), "multianewarray 2b CP, 1b;");
    }

    #[test]
    fn renders_constants() {
        let pool = ConstantPool::from_iter([
            (1, ConstantPoolRef::Literal(Literal::String("hi".to_string()))),
            (2, ConstantPoolRef::Literal(Literal::Int(42))),
            (3, ConstantPoolRef::Literal(Literal::Long(7))),
            (5, ConstantPoolRef::Class("java.lang.String".to_string())),
        ]);
        assert_eq!(render(&pool, &[0x12, 0x01]).unwrap(), "ldc \"hi\";");
        assert_eq!(render(&pool, &[0x13, 0x00, 0x02]).unwrap(), "ldc_w 42;");
        assert_eq!(render(&pool, &[0x14, 0x00, 0x03]).unwrap(), "ldc2_w 7;");
        assert_eq!(render(&pool, &[0x12, 0x05]).unwrap(), "ldc ?;");
        assert_eq!(render(&pool, &[0x12, 0x09]).unwrap(), "ldc ?;");
    }

    #[test]
    fn renders_member_refs() {
        let pool = ConstantPool::from_iter([
            (
                1,
                ConstantPoolRef::Field(MemberRef::new("java.lang.System", "out", "Ljava/io/PrintStream;")),
            ),
            (
                2,
                ConstantPoolRef::Method(MemberRef::new(
                    "java.io.PrintStream",
                    "println",
                    "(Ljava/lang/String;I)V",
                )),
            ),
            (3, ConstantPoolRef::Class("[[I".to_string())),
            (4, ConstantPoolRef::Class("a.b.Missing".to_string())),
        ]);
        assert_eq!(
            render(&pool, &[0xb2, 0x00, 0x01]).unwrap(),
            "getstatic System.out [PrintStream];"
        );
        assert_eq!(
            render(&pool, &[0xb6, 0x00, 0x02]).unwrap(),
            "invokevirtual PrintStream.println(String, int) [void];"
        );
        assert_eq!(render(&pool, &[0xc0, 0x00, 0x03]).unwrap(), "checkcast int[][];");
        assert_eq!(render(&pool, &[0xbb, 0x00, 0x04]).unwrap(), "new Missing;");
    }

    #[test]
    fn static_refs_are_styled_apart() {
        let pool = ConstantPool::from_iter([(
            1,
            ConstantPoolRef::Field(MemberRef::new("a.Counter", "count", "I")),
        )]);
        let resolver = Resolver::new(MemoryProvider::new());
        let renderer = InstructionRenderer::new(&resolver, &pool);
        let mut statics = StyledDocument::new();
        let mut instances = StyledDocument::new();
        for (doc, opcode) in [(&mut statics, 0xb2), (&mut instances, 0xb4)] {
            let code = [opcode, 0x00, 0x01];
            let instruction = Instructions::new(&code).next().unwrap().unwrap();
            renderer.render(doc, &instruction).unwrap();
        }
        assert!(statics.finish(OutputFormat::Html).contains("<i>count</i>"));
        assert!(!instances.finish(OutputFormat::Html).contains("<i>"));
    }

    #[test]
    fn wrong_kind_of_constant_is_an_error() {
        let pool = ConstantPool::from_iter([(1, ConstantPoolRef::Literal(Literal::Int(1)))]);
        let error = render(&pool, &[0xb4, 0x00, 0x01]).unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::InvalidConstantPoolRef { index: 1, .. }
        ));
    }
}
