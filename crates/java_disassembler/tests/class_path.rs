use itest_common::{access, write_class_dir, write_jar, ClassFileBuilder};
use java_disassembler::provider::{ClassPathProvider, TypeProvider};
use java_disassembler::{Disassembler, OutputFormat};
use pretty_assertions::assert_eq;

fn greeter() -> Vec<u8> {
    let mut builder = ClassFileBuilder::new("com/example/Greeter", Some("java/lang/Object"));
    builder.access(access::PUBLIC | access::SUPER);
    let out = builder.field_ref("java/lang/System", "out", "Ljava/io/PrintStream;");
    let println = builder.method_ref("java/io/PrintStream", "println", "(Ljava/lang/String;)V");
    let super_init = builder.method_ref("java/lang/Object", "<init>", "()V");
    let hello = builder.string("hello");

    let [out_hi, out_lo] = out.to_be_bytes();
    let [println_hi, println_lo] = println.to_be_bytes();
    let [init_hi, init_lo] = super_init.to_be_bytes();
    let constructor = [0x2a, 0xb7, init_hi, init_lo, 0xb1];
    let greet = [
        0xb2, out_hi, out_lo,
        0x12, hello as u8,
        0xb6, println_hi, println_lo,
        0xb1,
    ];

    builder
        .field(access::PRIVATE | access::STATIC | access::FINAL, "GREETING", "Ljava/lang/String;")
        .method(access::PUBLIC, "<init>", "()V", Some(&constructor[..]))
        .method(access::PUBLIC, "greet", "()V", Some(&greet[..]))
        .method(access::PUBLIC | access::NATIVE, "hash", "()I", None)
        .method(access::STATIC, "<clinit>", "()V", Some(&[0xb1][..]))
        .source_file("Greeter.java")
        .build()
}

#[test]
fn disassembles_from_jar() {
    let jar = write_jar("disassembles_from_jar", &[("com/example/Greeter", greeter())]);
    let disassembler = Disassembler::with_format(ClassPathProvider::from_iter([jar]), OutputFormat::Plain);
    let disassembly = disassembler
        .disassemble("com.example.Greeter")
        .expect("greeter is in the jar");

    assert_eq!(
        disassembly.text(),
        concat!(
            "package com.example;\n",
            "\n",
            "import java.lang.Object;\n",
            "import java.lang.System;\n",
            "import java.io.PrintStream;\n",
            "\n",
            "public class Greeter {\n",
            "\n",
            "    private static final String GREETING;\n",
            "\n",
            "    public Greeter() {\n",
            "        aload_0;\n",
            "        invokespecial Object.<init>() [void];\n",
            "        return;\n",
            "    }\n",
            "\n",
            "    public void greet() {\n",
            "        getstatic System.out [PrintStream];\n",
            "        ldc \"hello\";\n",
            "        invokevirtual PrintStream.println(String) [void];\n",
            "        return;\n",
            "    }\n",
            "\n",
            "    public native int hash();\n",
            "\n",
            "\n",
            "}\n",
        )
    );
    assert!(disassembly.diagnostics().is_empty());
    assert_eq!(disassembly.member_line("GREETING"), Some(8));
    assert_eq!(disassembly.member_line("<init>()V"), Some(10));
    assert_eq!(disassembly.member_line("greet()V"), Some(16));
    assert_eq!(disassembly.member_line("<clinit>()V"), None);
}

#[test]
fn classes_are_read_from_directories() {
    let mut builder = ClassFileBuilder::new("com/example/Shapes", Some("java/lang/Object"));
    builder.class("[Ljava/lang/String;");
    builder.class("[[I");
    let shapes = builder
        .inner_class("com/example/Shapes$Circle", "com/example/Shapes", "Circle", access::PUBLIC | access::STATIC)
        .source_file("Shapes.java")
        .method_with_attribute(access::PUBLIC, "draw", "()V", "Deprecated", &[])
        .build();
    let dir = write_class_dir("classes_are_read_from_directories", &[("com/example/Shapes", shapes)]);
    let provider = ClassPathProvider::from_iter([dir]);

    let class = provider.lookup("com.example.Shapes").unwrap();
    assert_eq!(class.source_file(), Some("Shapes.java"));
    assert_eq!(class.nested_classes(), &["com.example.Shapes$Circle".to_string()][..]);
    assert_eq!(
        class.referenced_classes().collect::<Vec<_>>(),
        ["java.lang.Object", "java.lang.String", "com.example.Shapes$Circle"]
    );

    let disassembly = Disassembler::with_format(&provider, OutputFormat::Plain).disassemble_class(&class);
    assert!(disassembly.text().contains(concat!(
        "    public void draw() {\n",
        "        Error: method is missing CodeAttribute!\n",
        "        Attributes: \n",
        "        Deprecated (0 bytes)\n",
        "    }\n",
    )));
}

#[test]
fn object_is_always_available() {
    let provider = ClassPathProvider::from_iter(Vec::<std::path::PathBuf>::new());
    let object = provider.lookup("java.lang.Object").unwrap();
    assert_eq!(object.name(), "java.lang.Object");
    assert!(!object.is_synthetic());
    assert!(provider.lookup("java.lang.String").unwrap_err().is_not_found());
}
