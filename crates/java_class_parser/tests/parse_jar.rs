use itest_common::{access, write_class_dir, write_jar, ClassFileBuilder};
use java_class_parser::attributes::AttributeKind;
use java_class_parser::constant_pool::Loadable;
use java_class_parser::error::ErrorKind;
use java_class_parser::{HasAttributes, JavaClassParser};
use pretty_assertions::assert_eq;

fn square() -> Vec<u8> {
    let mut builder = ClassFileBuilder::new("com/example/Square", Some("com/example/Rectangle"));
    builder.implements("com/example/Shape").source_file("Square.java");
    let greeting = builder.string("hello");
    let [hi, lo] = greeting.to_be_bytes();
    builder
        .field(access::PRIVATE | access::FINAL, "side", "I")
        .method(access::PUBLIC, "<init>", "()V", Some(&[0x2a, 0xb1][..]))
        .method(access::PUBLIC, "greet", "()Ljava/lang/String;", Some(&[0x13, hi, lo, 0xb0][..]))
        .method(access::PUBLIC | access::ABSTRACT, "area", "()D", None)
        .inner_class("com/example/Square$Side", "com/example/Square", "Side", access::STATIC);
    builder.build()
}

fn rectangle() -> Vec<u8> {
    ClassFileBuilder::new("com/example/Rectangle", Some("java/lang/Object")).build()
}

#[test]
fn parse_jar() {
    let jar = write_jar(
        "parse_jar",
        &[("com/example/Square", square()), ("com/example/Rectangle", rectangle())],
    );
    let parser = JavaClassParser::from(jar);
    let class = parser
        .find("com/example/Square")
        .expect("couldn't get square");
    assert_eq!(class.this().unwrap(), "com/example/Square");
    let super_name = class.super_name().unwrap().expect("square has a super class");
    assert_eq!(super_name, "com/example/Rectangle");
    assert_eq!(class.interfaces().unwrap(), ["com/example/Shape"]);

    let super_class = parser
        .find(&super_name.to_binary_name())
        .expect("Rectangle should be on the classpath");
    assert_eq!(super_class.super_name().unwrap().unwrap(), "java/lang/Object");
    assert!(
        matches!(
            parser.find("java.lang.Object").map_err(|e| e.kind().to_string()),
            Err(message) if message.contains("java/lang/Object")
        ),
        "Object should not be on the classpath"
    );
}

#[test]
fn parse_class_dir() {
    let dir = write_class_dir("parse_class_dir", &[("com/example/Square", square())]);
    let parser = JavaClassParser::from(dir);
    let class = parser.find("com.example.Square").expect("couldn't get square");

    assert_eq!(class.source_file(), Some("Square.java"));

    let fields = class.fields();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name().unwrap(), "side");
    assert_eq!(fields[0].descriptor().unwrap(), "I");

    let methods = class.methods();
    let names = methods
        .iter()
        .map(|method| method.name().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, ["<init>", "greet", "area"]);

    let greet = methods[1].code().expect("greet has code").expect("code is valid");
    assert_eq!(greet.code()[0], 0x13);
    let index = u16::from_be_bytes([greet.code()[1], greet.code()[2]]);
    assert_eq!(
        class.constant_pool().loadable(index).unwrap(),
        Loadable::String("hello")
    );
    assert!(methods[2].is_abstract_or_native());
    assert!(methods[2].code().is_none());

    let nested = class.nested_classes().unwrap();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].inner(), "com/example/Square$Side");
    assert_eq!(nested[0].simple_name(), Some("Side"));
    assert!(matches!(
        class.get_attribute("InnerClasses").map(|att| att.kind().clone()),
        Some(AttributeKind::InnerClasses(_))
    ));
}

#[test]
fn referenced_classes_follow_pool_order() {
    let class = java_class_parser::parse_bytes(&square()[..]).unwrap();
    let referenced = class
        .referenced_classes()
        .unwrap()
        .into_iter()
        .map(|name| name.to_binary_name())
        .collect::<Vec<_>>();
    assert_eq!(
        referenced,
        [
            "com.example.Square",
            "com.example.Rectangle",
            "com.example.Shape",
            "com.example.Square$Side"
        ]
    );
}

#[test]
fn rejects_bad_magic() {
    let mut bytes = rectangle();
    bytes[0] = 0;
    let error = java_class_parser::parse_bytes(&bytes[..]).unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::BadMagic(_)));
}
