use itest_common::{access, write_jar, ClassFileBuilder};
use pretty_assertions::assert_eq;
use std::process::Command;

fn disassembler() -> Command {
    Command::new(env!("CARGO_BIN_EXE_class-disassembler"))
}

fn counter_jar(test_name: &str) -> std::path::PathBuf {
    let mut builder = ClassFileBuilder::new("demo/Counter", Some("java/lang/Object"));
    builder.source_file("Counter.java");
    let count = builder.field_ref("demo/Counter", "count", "I");
    let [hi, lo] = count.to_be_bytes();
    let increment = [0x2a, 0x59, 0xb4, hi, lo, 0x04, 0x60, 0xb5, hi, lo, 0xb1];
    let class = builder
        .field(access::PRIVATE, "count", "I")
        .method(access::PUBLIC, "increment", "()V", Some(&increment[..]))
        .build();
    write_jar(test_name, &[("demo/Counter", class)])
}

#[test]
fn prints_plain_disassembly() {
    let jar = counter_jar("prints_plain_disassembly");
    let output = disassembler()
        .arg(&jar)
        .arg("demo.Counter")
        .arg("--plain")
        .output()
        .expect("could not run class-disassembler");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("package demo;\n"));
    assert!(stdout.contains(concat!(
        "    public void increment() {\n",
        "        aload_0;\n",
        "        dup;\n",
        "        getfield Counter.count [int];\n",
        "        iconst_1;\n",
        "        iadd;\n",
        "        putfield Counter.count [int];\n",
        "        return;\n",
        "    }\n",
    )));
}

#[test]
fn writes_html_to_a_file() {
    let jar = counter_jar("writes_html_to_a_file");
    let target = jar.with_file_name("Counter.html");
    let status = disassembler()
        .arg(&jar)
        .arg("demo.Counter")
        .arg("--output")
        .arg(&target)
        .status()
        .expect("could not run class-disassembler");
    assert!(status.success());
    let html = std::fs::read_to_string(&target).unwrap();
    assert!(html.starts_with("<div style='white-space:nowrap; font-family:\"Monospaced\"'>\n"));
    assert!(html.ends_with("</div>"));
}

#[test]
fn unknown_class_fails() {
    let jar = counter_jar("unknown_class_fails");
    let output = disassembler()
        .arg(&jar)
        .arg("demo.Missing")
        .output()
        .expect("could not run class-disassembler");
    assert!(!output.status.success());
    assert_eq!(output.stdout, b"");
}

#[test]
fn unwritable_output_is_reported() {
    let jar = counter_jar("unwritable_output_is_reported");
    let target = jar.with_file_name("missing-dir").join("Counter.html");
    let output = disassembler()
        .arg(&jar)
        .arg("demo.Counter")
        .arg("--output")
        .arg(&target)
        .output()
        .expect("could not run class-disassembler");
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("could not write the disassembly"), "{}", stderr);
}
