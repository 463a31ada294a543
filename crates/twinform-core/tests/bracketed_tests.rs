use std::cell::RefCell;
use std::rc::Rc;

use twinform_core::bracketed::{from_str, parse, render, to_string};
use twinform_core::{record, Error, Value};

#[derive(Debug, Default, PartialEq)]
struct Server {
    host: String,
    port: u16,
    tags: Vec<String>,
}

record!(Server { host, port, tags });

#[derive(Debug, Default)]
struct Link {
    label: String,
    next: Option<Rc<RefCell<Link>>>,
}

record!(Link { label, next });

fn s(text: &str) -> Value {
    Value::Str(text.to_string())
}

fn assert_format_error(text: &str) {
    match parse(text) {
        Err(Error::Format { .. }) => {}
        other => panic!("expected a format error for {text:?}, got {other:?}"),
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn render_is_compact() {
    let server = Server {
        host: "localhost".to_string(),
        port: 8080,
        tags: vec!["a".to_string(), "b".to_string()],
    };
    assert_eq!(
        to_string(&server).unwrap(),
        r#"{"host":"localhost","port":8080,"tags":["a","b"]}"#
    );
}

#[test]
fn render_scalars() {
    assert_eq!(render(&Value::Null), "null");
    assert_eq!(render(&Value::Bool(false)), "false");
    assert_eq!(render(&Value::Number(-2.5)), "-2.5");
    assert_eq!(render(&Value::Number(1e21)), "1000000000000000000000");
    assert_eq!(render(&Value::Number(f64::INFINITY)), "null");
    assert_eq!(render(&Value::Seq(vec![])), "[]");
    assert_eq!(render(&Value::Map(vec![])), "{}");
}

#[test]
fn render_escapes_strings_and_keys() {
    let value = Value::Map(vec![("k\"ey".to_string(), s("a\\b\nc\r\td"))]);
    assert_eq!(render(&value), r#"{"k\"ey":"a\\b\nc\r\td"}"#);
}

#[test]
fn render_output_is_valid_json() {
    let value = Value::Map(vec![
        ("name".to_string(), s("quote \" and \\ slash")),
        (
            "items".to_string(),
            Value::Seq(vec![Value::Number(1.0), Value::Null, Value::Bool(true)]),
        ),
        ("nested".to_string(), Value::Map(vec![("x".to_string(), Value::Number(0.5))])),
    ]);
    let json: serde_json::Value = serde_json::from_str(&render(&value)).unwrap();
    assert_eq!(Value::from(json), value);
}

#[test]
fn cyclic_graph_is_rejected() {
    let a = Rc::new(RefCell::new(Link {
        label: "a".to_string(),
        next: None,
    }));
    let b = Rc::new(RefCell::new(Link {
        label: "b".to_string(),
        next: Some(Rc::clone(&a)),
    }));
    a.borrow_mut().next = Some(Rc::clone(&b));

    assert_eq!(to_string(&a).unwrap_err(), Error::CyclicGraph);

    // Break the cycle so the nodes are freed.
    a.borrow_mut().next = None;
    assert_eq!(
        to_string(&a).unwrap(),
        r#"{"label":"a","next":null}"#
    );
}

#[test]
fn shared_acyclic_nodes_render_in_full() {
    let tail = Rc::new(RefCell::new(Link {
        label: "tail".to_string(),
        next: None,
    }));
    let both = vec![Rc::clone(&tail), tail];
    assert_eq!(
        to_string(&both).unwrap(),
        r#"[{"label":"tail","next":null},{"label":"tail","next":null}]"#
    );
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn parse_literals() {
    assert_eq!(parse("null").unwrap(), Value::Null);
    assert_eq!(parse(" true ").unwrap(), Value::Bool(true));
    assert_eq!(parse("false").unwrap(), Value::Bool(false));
    assert_eq!(parse("-12.5e1").unwrap(), Value::Number(-125.0));
    assert_eq!(parse(r#""hi""#).unwrap(), s("hi"));
}

#[test]
fn parse_preserves_member_order() {
    assert_eq!(
        parse(r#"{ "b" : 1 , "a" : { "c" : [ ] } }"#).unwrap(),
        Value::Map(vec![
            ("b".to_string(), Value::Number(1.0)),
            (
                "a".to_string(),
                Value::Map(vec![("c".to_string(), Value::Seq(vec![]))])
            ),
        ])
    );
}

#[test]
fn parse_accepts_serde_json_output() {
    let json = serde_json::json!({
        "name": "Alice",
        "scores": [95, 87.5, -3],
        "meta": {"ok": true, "none": null, "text": "a,b:{c}[d]"}
    });
    let text = serde_json::to_string_pretty(&json).unwrap();
    assert_eq!(parse(&text).unwrap(), Value::from(json));
}

#[test]
fn parse_value_colons_and_commas_inside_strings() {
    assert_eq!(
        parse(r#"{"time":"12:30","list":"a,b"}"#).unwrap(),
        Value::Map(vec![
            ("time".to_string(), s("12:30")),
            ("list".to_string(), s("a,b")),
        ])
    );
}

#[test]
fn parse_errors() {
    for text in [
        "nope",
        "NaN",
        "inf",
        r#""unterminated"#,
        r#""a" "b""#,
        "[1,2",
        "[1,2]]",
        "{\"a\":1",
        "{\"a\" 1}",
        "{a:1}",
        "[1,,2]",
        "[1,]",
        "{,}",
        "]",
    ] {
        assert_format_error(text);
    }
}

#[test]
fn deeply_nested_input_is_a_format_error() {
    let deep = format!("{}{}", "[".repeat(5000), "]".repeat(5000));
    assert_format_error(&deep);
    let objects = format!("{}1{}", r#"{"a":"#.repeat(5000), "}".repeat(5000));
    assert_format_error(&objects);
}

#[test]
fn parse_errors_name_byte_offset() {
    match parse(r#"{"a":[1,2],"b":tru}"#).unwrap_err() {
        Error::Format { line, message } => {
            assert_eq!(line, 0);
            assert_eq!(message, "unexpected token 'tru' at byte 15");
        }
        other => panic!("expected a format error, got {other:?}"),
    }
}

#[test]
fn from_str_binds_record() {
    let server: Server = from_str(r#"{"port":443,"host":"example.org"}"#).unwrap();
    assert_eq!(
        server,
        Server {
            host: "example.org".to_string(),
            port: 443,
            tags: Vec::new(),
        }
    );
}

#[test]
fn from_str_rejects_out_of_range_port() {
    let err = from_str::<Server>(r#"{"port":70000}"#).unwrap_err();
    assert!(matches!(err, Error::UnsupportedConversion { expected: "u16", .. }));
}

#[test]
fn from_str_rejects_integers_past_64_bit_max() {
    let err = from_str::<u64>("18446744073709551616").unwrap_err();
    assert!(matches!(err, Error::UnsupportedConversion { expected: "u64", .. }));
    let err = from_str::<i64>("9223372036854775808").unwrap_err();
    assert!(matches!(err, Error::UnsupportedConversion { expected: "i64", .. }));
    assert_eq!(from_str::<i64>("-9223372036854775808").unwrap(), i64::MIN);
}

#[test]
fn from_str_rejects_empty() {
    assert!(matches!(from_str::<Server>(""), Err(Error::InvalidInput(_))));
    assert!(matches!(from_str::<Server>(" \n "), Err(Error::InvalidInput(_))));
}
