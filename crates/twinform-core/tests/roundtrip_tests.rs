use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use twinform_core::{record, Error, Format};

const FORMATS: [Format; 2] = [Format::Bracketed, Format::Indented];

#[derive(Debug, Default, Clone, PartialEq)]
struct Address {
    street: Option<String>,
    city: Option<String>,
    country: Option<String>,
}

record!(Address {
    street as "Street",
    city as "City",
    country as "Country",
});

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    name: Option<String>,
    age: i32,
    is_student: bool,
    birth_date: NaiveDateTime,
    hobbies: Option<Vec<String>>,
    address: Option<Address>,
}

record!(Person {
    name as "Name",
    age as "Age",
    is_student as "IsStudent",
    birth_date as "BirthDate",
    hobbies as "Hobbies",
    address as "Address",
});

fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn john() -> Person {
    Person {
        name: Some("John Doe".to_string()),
        age: 30,
        is_student: true,
        birth_date: date(1993, 5, 15),
        hobbies: Some(vec![
            "reading".to_string(),
            "gaming".to_string(),
            "traveling".to_string(),
        ]),
        address: Some(Address {
            street: Some("123 Main St".to_string()),
            city: Some("New York".to_string()),
            country: Some("USA".to_string()),
        }),
    }
}

/// Serialize then deserialize through `format`, reporting the text on failure.
fn roundtrip<T>(format: Format, value: &T) -> T
where
    T: twinform_core::ToValue + twinform_core::FromValue,
{
    let text = format.serialize(value).expect("serialize failed");
    format
        .deserialize(&text)
        .unwrap_or_else(|e| panic!("{format} deserialize failed: {e}\n  text: {text}"))
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn roundtrip_person() {
    for format in FORMATS {
        assert_eq!(roundtrip(format, &john()), john(), "{format}");
    }
}

#[test]
fn roundtrip_person_with_missing_optionals() {
    let person = Person {
        name: Some("Solo".to_string()),
        age: 5,
        ..Person::default()
    };
    for format in FORMATS {
        assert_eq!(roundtrip(format, &person), person, "{format}");
    }
}

#[test]
fn roundtrip_person_with_empty_list() {
    let person = Person {
        hobbies: Some(Vec::new()),
        ..john()
    };
    for format in FORMATS {
        assert_eq!(roundtrip(format, &person), person, "{format}");
    }
}

#[test]
fn roundtrip_list_of_records() {
    let people = vec![john(), Person::default(), john()];
    for format in FORMATS {
        assert_eq!(roundtrip(format, &people), people, "{format}");
    }
}

// ============================================================================
// Primitives
// ============================================================================

#[test]
fn roundtrip_integer() {
    for format in FORMATS {
        assert_eq!(roundtrip(format, &42i32), 42, "{format}");
        assert_eq!(roundtrip(format, &-7i64), -7, "{format}");
        assert_eq!(roundtrip(format, &0u8), 0, "{format}");
    }
}

#[test]
fn roundtrip_float() {
    for format in FORMATS {
        assert_eq!(roundtrip(format, &3.25f64), 3.25, "{format}");
        assert_eq!(roundtrip(format, &-0.5f32), -0.5, "{format}");
    }
}

#[test]
fn roundtrip_bool() {
    for format in FORMATS {
        assert!(roundtrip(format, &true), "{format}");
        assert!(!roundtrip(format, &false), "{format}");
    }
}

#[test]
fn roundtrip_string() {
    let text = "Hello, World!".to_string();
    for format in FORMATS {
        assert_eq!(roundtrip(format, &text), text, "{format}");
    }
}

#[test]
fn roundtrip_strings_that_look_like_other_scalars() {
    for text in ["42", "true", "null", "", "  padded  ", "- dash", "a: b", "[]", "~"] {
        let text = text.to_string();
        for format in FORMATS {
            assert_eq!(roundtrip(format, &text), text, "{format}: {text:?}");
        }
    }
}

#[test]
fn roundtrip_datetime() {
    let when = date(2024, 3, 15);
    for format in FORMATS {
        assert_eq!(roundtrip(format, &when), when, "{format}");
    }
}

#[test]
fn indented_keeps_sub_second_precision() {
    let when = NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_micro_opt(9, 30, 15, 123_456)
        .unwrap();
    assert_eq!(roundtrip(Format::Indented, &when), when);
    // The bracketed form stops at whole seconds.
    assert_eq!(
        roundtrip(Format::Bracketed, &when),
        when.with_nanosecond(0).unwrap()
    );
}

#[test]
fn roundtrip_utc_and_date() {
    let instant: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    for format in FORMATS {
        assert_eq!(roundtrip(format, &instant), instant, "{format}");
        assert_eq!(roundtrip(format, &day), day, "{format}");
    }
}

// ============================================================================
// Ordered lists
// ============================================================================

#[test]
fn roundtrip_list_of_strings() {
    let list = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    for format in FORMATS {
        assert_eq!(roundtrip(format, &list), list, "{format}");
    }
}

#[test]
fn roundtrip_nested_lists() {
    let grid = vec![vec![1, 2], vec![], vec![3]];
    for format in FORMATS {
        assert_eq!(roundtrip(format, &grid), grid, "{format}");
    }
}

// ============================================================================
// Escaping
// ============================================================================

#[test]
fn roundtrip_special_characters() {
    let text = "Line 1\nLine 2\tTabbed\r\nQuoted \"text\"".to_string();
    for format in FORMATS {
        assert_eq!(roundtrip(format, &text), text, "{format}");
    }
}

#[test]
fn roundtrip_backslashes() {
    let text = r#"C:\path\to\"file""#.to_string();
    for format in FORMATS {
        assert_eq!(roundtrip(format, &text), text, "{format}");
    }
}

// ============================================================================
// Null and empty input
// ============================================================================

#[test]
fn serialize_none_is_null() {
    for format in FORMATS {
        assert_eq!(format.serialize(&None::<Person>).unwrap(), "null", "{format}");
    }
}

#[test]
fn deserialize_null_into_option_is_none() {
    for format in FORMATS {
        let person: Option<Person> = format.deserialize("null").unwrap();
        assert_eq!(person, None, "{format}");
    }
}

#[test]
fn deserialize_null_into_record_is_default() {
    for format in FORMATS {
        let person: Person = format.deserialize("null").unwrap();
        assert_eq!(person, Person::default(), "{format}");
    }
}

#[test]
fn deserialize_empty_input_is_invalid() {
    for format in FORMATS {
        for text in ["", "   ", "\n\t\n"] {
            let err = format.deserialize::<Person>(text).unwrap_err();
            assert!(
                matches!(err, Error::InvalidInput(_)),
                "{format}: {text:?} gave {err:?}"
            );
        }
    }
}

// ============================================================================
// Conversion failures
// ============================================================================

#[test]
fn sequence_into_record_is_unsupported() {
    for format in FORMATS {
        let text = format.serialize(&vec!["a", "b"]).unwrap();
        let err = format.deserialize::<Person>(&text).unwrap_err();
        assert!(
            matches!(err, Error::UnsupportedConversion { .. }),
            "{format}: {err:?}"
        );
    }
}

#[test]
fn record_into_list_is_unsupported() {
    for format in FORMATS {
        let text = format.serialize(&john()).unwrap();
        let err = format.deserialize::<Vec<String>>(&text).unwrap_err();
        assert!(
            matches!(err, Error::UnsupportedConversion { .. }),
            "{format}: {err:?}"
        );
    }
}

#[test]
fn fractional_number_into_integer_is_unsupported() {
    for format in FORMATS {
        let err = format.deserialize::<i32>("2.5").unwrap_err();
        assert!(matches!(err, Error::UnsupportedConversion { .. }), "{format}");
    }
}

#[test]
fn bad_date_text_is_unsupported() {
    for format in FORMATS {
        let text = format.serialize("not a date").unwrap();
        let err = format.deserialize::<NaiveDateTime>(&text).unwrap_err();
        assert!(matches!(err, Error::UnsupportedConversion { .. }), "{format}");
    }
}
