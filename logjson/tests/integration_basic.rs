//! End-to-end tests for rendering through the public API.
//!
//! These tests exercise the integration of:
//! - `Loggable` derive descriptions,
//! - field rule resolution (directives, type rules, runtime rules), and
//! - plan compilation for common standard library types.

use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
    marker::PhantomData,
};

use logjson::{
    Encoder, FieldRules, LogJson, LogMarshaler, LogRule, LogValue, Loggable, marshal_to_string,
    reflect::{Kind, TypeInfo, json_marshaler_of, log_marshaler_of},
};
use serde_json::json;

const HELLO_DIGEST: &str = "5;5d41402abc4b2a76b9719d911017c592";

mod scalars_and_collections {
    use super::*;

    #[test]
    fn absent_top_level_value_is_null() {
        assert_eq!(marshal_to_string(&None::<String>), "null");
        assert_eq!(LogJson::new().marshal_dyn(None), b"null");
    }

    #[test]
    fn byte_vectors_are_unpadded_base64() {
        assert_eq!(marshal_to_string(&b"hello".to_vec()), r#""aGVsbG8""#);
        assert_eq!(marshal_to_string(&Vec::<u8>::new()), r#""""#);
    }

    #[test]
    fn byte_arrays_and_deques_are_numbers() {
        assert_eq!(marshal_to_string(&[1_u8, 2]), "[1,2]");
        assert_eq!(marshal_to_string(&VecDeque::from([3_u8])), "[3]");
    }

    #[test]
    fn non_finite_floats_are_strings() {
        let values = vec![1.5, f64::NAN, f64::NEG_INFINITY];
        assert_eq!(marshal_to_string(&values), r#"[1.5,"NaN","-Infinity"]"#);
    }

    #[test]
    fn map_keys_are_stringified() {
        let numbers: BTreeMap<i32, bool> = [(-1, true), (2, false)].into();
        assert_eq!(marshal_to_string(&numbers), r#"{"-1":true,"2":false}"#);

        let chars: BTreeMap<char, u8> = [('a', 1)].into();
        assert_eq!(marshal_to_string(&chars), r#"{"a":1}"#);

        let flags: BTreeMap<bool, &'static str> = [(false, "off")].into();
        assert_eq!(marshal_to_string(&flags), r#"{"false":"off"}"#);
    }

    #[test]
    fn struct_keyed_map_is_null() {
        #[derive(Loggable, PartialEq, Eq, PartialOrd, Ord)]
        struct Key {
            id: u32,
        }

        let map: BTreeMap<Key, String> = [(Key { id: 1 }, "one".to_string())].into();
        assert_eq!(marshal_to_string(&map), "null");
    }

    #[test]
    fn newtype_and_unit_enum_keys_are_stringified() {
        #[derive(Loggable, PartialEq, Eq, PartialOrd, Ord)]
        struct UserId(String);

        #[derive(Loggable, PartialEq, Eq, PartialOrd, Ord)]
        struct Port(u16);

        #[derive(Loggable, PartialEq, Eq, PartialOrd, Ord)]
        enum Color {
            Red,
            #[log(rename = "green")]
            Green,
        }

        let users: BTreeMap<UserId, u8> = [(UserId("alice".into()), 1)].into();
        assert_eq!(marshal_to_string(&users), r#"{"alice":1}"#);

        let ports: BTreeMap<Port, bool> = [(Port(8080), true)].into();
        assert_eq!(marshal_to_string(&ports), r#"{"8080":true}"#);

        let colors: BTreeMap<Color, u8> = [(Color::Red, 1), (Color::Green, 2)].into();
        assert_eq!(marshal_to_string(&colors), r#"{"Red":1,"green":2}"#);
    }

    #[test]
    fn keys_without_a_string_form_make_the_map_null() {
        #[derive(Loggable, PartialEq, Eq, PartialOrd, Ord)]
        enum Shape {
            Dot,
            Circle(u8),
        }

        #[derive(Loggable, PartialEq, Eq, PartialOrd, Ord)]
        struct Inner {
            id: u32,
        }

        #[derive(Loggable, PartialEq, Eq, PartialOrd, Ord)]
        struct Wrapped(Inner);

        let shapes: BTreeMap<Shape, u8> = [(Shape::Dot, 1), (Shape::Circle(2), 3)].into();
        assert_eq!(marshal_to_string(&shapes), "null");

        let wrapped: BTreeMap<Wrapped, u8> = [(Wrapped(Inner { id: 1 }), 1)].into();
        assert_eq!(marshal_to_string(&wrapped), "null");
    }

    #[test]
    fn output_is_deterministic_and_single_line() {
        let value: BTreeMap<String, Vec<Option<u8>>> =
            [("a".to_string(), vec![Some(1), None])].into();
        let first = marshal_to_string(&value);
        assert_eq!(first, marshal_to_string(&value));
        assert_eq!(first, r#"{"a":[1,null]}"#);
        assert!(!first.contains('\n'));
    }

    #[test]
    fn serde_json_values_render_verbatim() {
        let value = json!({"b": 1, "a": [true, null, "x"]});
        assert_eq!(marshal_to_string(&value), r#"{"a":[true,null,"x"],"b":1}"#);
    }

    #[test]
    fn errors_render_their_display_text() {
        let err = std::io::Error::other("disk full");
        assert_eq!(marshal_to_string(&err), r#""disk full""#);
        let parse = "x".parse::<u8>().unwrap_err();
        assert_eq!(marshal_to_string(&parse), r#""invalid digit found in string""#);
    }
}

mod derived_structs {
    use super::*;

    #[test]
    fn fields_render_in_declaration_order() {
        #[derive(Loggable)]
        struct Order {
            zeta: u8,
            alpha: String,
            tags: Vec<&'static str>,
        }

        let order = Order {
            zeta: 1,
            alpha: "a".into(),
            tags: vec!["x"],
        };
        assert_eq!(
            marshal_to_string(&order),
            r#"{"zeta":1,"alpha":"a","tags":["x"]}"#
        );
    }

    #[test]
    fn private_fields_render_like_public_ones() {
        mod accounts {
            #[derive(logjson::Loggable)]
            pub struct Account {
                pub id: u32,
                pub(crate) region: &'static str,
                balance: i64,
                #[log(omit)]
                _pin: u16,
            }

            impl Account {
                pub fn new() -> Self {
                    Self {
                        id: 1,
                        region: "eu",
                        balance: -5,
                        _pin: 1234,
                    }
                }
            }
        }

        assert_eq!(
            marshal_to_string(&accounts::Account::new()),
            r#"{"id":1,"region":"eu","balance":-5}"#
        );
    }

    #[test]
    fn omit_directive_removes_the_field() {
        #[derive(Loggable)]
        struct User {
            #[log(omit)]
            name: String,
        }

        assert_eq!(marshal_to_string(&User { name: "x".into() }), "{}");
    }

    #[test]
    fn omitted_fields_need_not_be_loggable() {
        struct Socket;

        #[derive(Loggable)]
        struct Connection {
            host: String,
            #[log(omit)]
            socket: Socket,
        }

        let connection = Connection {
            host: "db".into(),
            socket: Socket,
        };
        assert_eq!(marshal_to_string(&connection), r#"{"host":"db"}"#);
    }

    #[test]
    fn digest_directive_replaces_text() {
        #[derive(Loggable)]
        struct Session {
            #[log(digest)]
            token: String,
            #[log(md5)]
            previous: Option<String>,
            #[log(digest)]
            missing: Option<String>,
        }

        let session = Session {
            token: "hello".into(),
            previous: Some("hello".into()),
            missing: None,
        };
        assert_eq!(
            marshal_to_string(&session),
            format!(r#"{{"token":"{HELLO_DIGEST}","previous":"{HELLO_DIGEST}","missing":null}}"#)
        );
    }

    #[test]
    fn digest_length_counts_bytes() {
        #[derive(Loggable)]
        struct Name {
            #[log(digest)]
            value: &'static str,
        }

        let rendered = marshal_to_string(&Name { value: "é" });
        assert!(rendered.starts_with(r#"{"value":"2;"#), "{rendered}");
    }

    #[test]
    fn digest_on_other_kinds_is_ignored() {
        #[derive(Loggable)]
        struct Counter {
            #[log(digest)]
            count: u32,
            #[log(digest)]
            names: Vec<String>,
        }

        let counter = Counter {
            count: 3,
            names: vec!["a".into()],
        };
        assert_eq!(marshal_to_string(&counter), r#"{"count":3,"names":["a"]}"#);
    }

    #[test]
    fn omitempty_skips_only_empty_values() {
        #[derive(Loggable)]
        struct Note {
            #[log(omitempty)]
            text: String,
        }

        assert_eq!(marshal_to_string(&Note { text: String::new() }), "{}");
        assert_eq!(
            marshal_to_string(&Note { text: "hi".into() }),
            r#"{"text":"hi"}"#
        );
    }

    #[test]
    fn omitempty_by_kind() {
        #[derive(Loggable)]
        struct Sparse {
            #[log(omitempty)]
            flag: bool,
            #[log(omitempty)]
            count: i64,
            #[log(omitempty)]
            ratio: f32,
            #[log(omitempty)]
            items: Vec<u8>,
            #[log(omitempty)]
            lookup: BTreeMap<String, u8>,
            #[log(omitempty)]
            parent: Option<Box<u8>>,
            #[log(omitempty)]
            fixed: [u8; 0],
        }

        let empty = Sparse {
            flag: false,
            count: 0,
            ratio: 0.0,
            items: Vec::new(),
            lookup: BTreeMap::new(),
            parent: None,
            fixed: [],
        };
        assert_eq!(marshal_to_string(&empty), "{}");

        let full = Sparse {
            flag: true,
            count: -1,
            ratio: 0.5,
            items: vec![1],
            lookup: [("k".to_string(), 1)].into(),
            parent: Some(Box::new(0)),
            fixed: [],
        };
        assert_eq!(
            marshal_to_string(&full),
            r#"{"flag":true,"count":-1,"ratio":0.5,"items":"AQ","lookup":{"k":1},"parent":0}"#
        );
    }

    #[test]
    fn rename_and_serde_rename() {
        #[derive(Loggable, serde::Serialize)]
        struct Account {
            #[serde(rename = "userId")]
            user_id: u64,
            #[log(rename = "n")]
            #[serde(rename = "name")]
            name: String,
            r#type: u8,
        }

        let account = Account {
            user_id: 1,
            name: "a".into(),
            r#type: 2,
        };
        assert_eq!(
            marshal_to_string(&account),
            r#"{"userId":1,"n":"a","type":2}"#
        );
    }

    #[test]
    fn tuple_unit_and_newtype_structs() {
        #[derive(Loggable)]
        struct Pair(u8, String);

        #[derive(Loggable)]
        struct Marker;

        #[derive(Loggable)]
        struct UserId(u64);

        assert_eq!(marshal_to_string(&Pair(1, "a".into())), r#"{"0":1,"1":"a"}"#);
        assert_eq!(marshal_to_string(&Marker), "{}");
        assert_eq!(marshal_to_string(&UserId(42)), "42");
    }

    #[test]
    fn newtype_emptiness_follows_its_field() {
        #[derive(Loggable)]
        struct UserId(u64);

        #[derive(Loggable)]
        struct Request {
            #[log(omitempty)]
            user: UserId,
        }

        assert_eq!(marshal_to_string(&Request { user: UserId(0) }), "{}");
        assert_eq!(
            marshal_to_string(&Request { user: UserId(9) }),
            r#"{"user":9}"#
        );
    }

    #[test]
    fn generic_structs() {
        struct Opaque;

        #[derive(Loggable)]
        struct Page<T> {
            items: Vec<T>,
            total: usize,
        }

        #[derive(Loggable)]
        struct TypedId<T> {
            id: u32,
            _kind: PhantomData<T>,
        }

        let page = Page {
            items: vec!["a", "b"],
            total: 2,
        };
        assert_eq!(marshal_to_string(&page), r#"{"items":["a","b"],"total":2}"#);

        let id = TypedId::<Opaque> {
            id: 1,
            _kind: PhantomData,
        };
        assert_eq!(marshal_to_string(&id), r#"{"id":1,"_kind":null}"#);
    }
}

mod flatten {
    use super::*;

    #[derive(Loggable)]
    struct Meta {
        id: u32,
        name: String,
    }

    #[test]
    fn nested_fields_are_promoted_in_place() {
        #[derive(Loggable)]
        struct Document {
            title: String,
            #[log(flatten)]
            meta: Meta,
            size: u8,
        }

        let doc = Document {
            title: "t".into(),
            meta: Meta {
                id: 1,
                name: "m".into(),
            },
            size: 2,
        };
        assert_eq!(
            marshal_to_string(&doc),
            r#"{"title":"t","id":1,"name":"m","size":2}"#
        );
    }

    #[test]
    fn shallower_field_shadows_promoted_one() {
        #[derive(Loggable)]
        struct Document {
            name: String,
            #[log(flatten)]
            meta: Meta,
        }

        let doc = Document {
            name: "outer".into(),
            meta: Meta {
                id: 1,
                name: "inner".into(),
            },
        };
        assert_eq!(marshal_to_string(&doc), r#"{"name":"outer","id":1}"#);
    }

    #[test]
    fn ambiguous_promoted_fields_are_dropped() {
        #[derive(Loggable)]
        struct Audit {
            id: u32,
            by: String,
        }

        #[derive(Loggable)]
        struct Record {
            #[log(flatten)]
            meta: Meta,
            #[log(flatten)]
            audit: Audit,
        }

        let record = Record {
            meta: Meta {
                id: 1,
                name: "m".into(),
            },
            audit: Audit {
                id: 2,
                by: "ops".into(),
            },
        };
        assert_eq!(marshal_to_string(&record), r#"{"name":"m","by":"ops"}"#);
    }

    #[test]
    fn omitted_field_still_shadows() {
        #[derive(Loggable)]
        struct Document {
            #[log(omit)]
            name: String,
            #[log(flatten)]
            meta: Meta,
        }

        let doc = Document {
            name: "outer".into(),
            meta: Meta {
                id: 1,
                name: "inner".into(),
            },
        };
        assert_eq!(marshal_to_string(&doc), r#"{"id":1}"#);
    }

    #[test]
    fn flatten_on_non_struct_renders_normally() {
        #[derive(Loggable)]
        struct Wrapper {
            #[log(flatten)]
            count: u8,
        }

        assert_eq!(marshal_to_string(&Wrapper { count: 1 }), r#"{"count":1}"#);
    }
}

mod rules {
    use super::*;

    #[derive(Loggable)]
    #[log(field_rules)]
    struct Login {
        user: String,
        #[log(digest)]
        password: String,
        token: String,
        email: String,
    }

    impl FieldRules for Login {
        fn field_rule(field: &str) -> Option<LogRule> {
            match field {
                "password" => Some(LogRule::Omit),
                "token" => Some(LogRule::Digest),
                _ => None,
            }
        }
    }

    fn login() -> Login {
        Login {
            user: "u".into(),
            password: "hello".into(),
            token: "hello".into(),
            email: "e".into(),
        }
    }

    #[test]
    fn directive_beats_type_rule_beats_runtime_rule() {
        let json = LogJson::new();
        json.add_log_rule("token", LogRule::Omit);
        json.add_log_rule("email", LogRule::Omit);

        let rendered = String::from_utf8(json.marshal(&login())).unwrap();
        assert_eq!(
            rendered,
            format!(r#"{{"user":"u","password":"{HELLO_DIGEST}","token":"{HELLO_DIGEST}"}}"#)
        );
    }

    #[test]
    fn runtime_rules_apply_across_types() {
        #[derive(Loggable)]
        struct Signup {
            email: String,
            #[log(rename = "mail")]
            contact: String,
        }

        let json = LogJson::new();
        json.add_log_rule("email", LogRule::Omit);
        json.add_log_rule("mail", LogRule::Digest);

        let signup = Signup {
            email: "a@b".into(),
            contact: "hello".into(),
        };
        assert_eq!(
            String::from_utf8(json.marshal(&signup)).unwrap(),
            format!(r#"{{"mail":"{HELLO_DIGEST}"}}"#)
        );
    }

    #[test]
    fn rules_parse_from_text() {
        assert_eq!("omit".parse::<LogRule>().unwrap(), LogRule::Omit);
        assert_eq!("md5".parse::<LogRule>().unwrap(), LogRule::Digest);
        assert!("mask".parse::<LogRule>().is_err());
    }
}

mod enums {
    use super::*;

    #[derive(Loggable)]
    enum Event {
        Started,
        #[log(rename = "stopped")]
        Stopped {
            code: i32,
            #[log(omit)]
            reason: String,
        },
        Moved(u8, u8),
        Renamed {
            #[log(digest)]
            to: String,
        },
    }

    #[test]
    fn unit_variants_are_strings() {
        assert_eq!(marshal_to_string(&Event::Started), r#""Started""#);
    }

    #[test]
    fn data_variants_are_single_member_objects() {
        let stopped = Event::Stopped {
            code: 1,
            reason: "oom".into(),
        };
        assert_eq!(marshal_to_string(&stopped), r#"{"stopped":{"code":1}}"#);
        assert_eq!(
            marshal_to_string(&Event::Moved(1, 2)),
            r#"{"Moved":{"0":1,"1":2}}"#
        );
        assert_eq!(
            marshal_to_string(&Event::Renamed { to: "hello".into() }),
            format!(r#"{{"Renamed":{{"to":"{HELLO_DIGEST}"}}}}"#)
        );
    }

    #[test]
    fn enums_inside_containers() {
        let events = vec![Some(Event::Started), None, Some(Event::Moved(0, 0))];
        assert_eq!(
            marshal_to_string(&events),
            r#"["Started",null,{"Moved":{"0":0,"1":0}}]"#
        );
    }
}

mod capabilities {
    use super::*;

    #[derive(Loggable)]
    #[log(marshaler)]
    struct Card {
        number: String,
    }

    impl LogMarshaler for Card {
        fn marshal_log_json(&self, encoder: &mut Encoder) {
            let last = &self.number[self.number.len().saturating_sub(4)..];
            encoder.write_str(&format!("****{last}"));
        }
    }

    #[derive(Loggable, serde::Serialize)]
    #[log(serialize)]
    struct Point {
        y: i32,
        x: i32,
    }

    #[derive(Debug, Loggable)]
    #[log(error)]
    struct Failure;

    impl fmt::Display for Failure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Failure {}

    #[test]
    fn log_marshaler_replaces_structure() {
        let card = Card {
            number: "4111111111111234".into(),
        };
        assert_eq!(marshal_to_string(&card), r#""****1234""#);
    }

    #[test]
    fn serialize_keeps_member_order() {
        assert_eq!(marshal_to_string(&Point { y: 1, x: 2 }), r#"{"y":1,"x":2}"#);
    }

    #[test]
    fn error_renders_display_text() {
        assert_eq!(marshal_to_string(&Failure), r#""boom""#);
    }

    #[test]
    fn log_marshaler_beats_serialize() {
        #[derive(serde::Serialize)]
        struct Both;

        impl LogMarshaler for Both {
            fn marshal_log_json(&self, encoder: &mut Encoder) {
                encoder.write_str("log");
            }
        }

        impl Loggable for Both {
            fn type_info() -> TypeInfo {
                TypeInfo::of::<Self>(Kind::Unsupported)
                    .with_json_marshaler(json_marshaler_of::<Self>)
                    .with_log_marshaler(log_marshaler_of::<Self>)
            }
        }

        assert_eq!(marshal_to_string(&Both), r#""log""#);
    }

    #[test]
    fn declarative_impl_for_foreign_style_types() {
        struct Version(u16, u16);

        impl LogMarshaler for Version {
            fn marshal_log_json(&self, encoder: &mut Encoder) {
                encoder.begin_object();
                encoder.write_str("major");
                encoder.write_uint(u64::from(self.0));
                encoder.write_str("minor");
                encoder.write_uint(u64::from(self.1));
                encoder.end_object();
            }
        }

        logjson::impl_loggable!(Version => marshaler);

        #[derive(Loggable)]
        struct Release {
            version: Version,
            stable: bool,
        }

        let release = Release {
            version: Version(1, 4),
            stable: true,
        };
        assert_eq!(
            marshal_to_string(&release),
            r#"{"version":{"major":1,"minor":4},"stable":true}"#
        );
    }

    #[test]
    fn marshaler_output_is_completed_in_place() {
        struct Silent;

        impl LogMarshaler for Silent {
            fn marshal_log_json(&self, _encoder: &mut Encoder) {}
        }

        struct Unclosed;

        impl LogMarshaler for Unclosed {
            fn marshal_log_json(&self, encoder: &mut Encoder) {
                encoder.begin_object();
                encoder.write_str("x");
                encoder.write_int(1);
            }
        }

        logjson::impl_loggable!(Silent => marshaler);
        logjson::impl_loggable!(Unclosed => marshaler);

        #[derive(Loggable)]
        struct Holder {
            silent: Silent,
            unclosed: Unclosed,
            after: u8,
        }

        let holder = Holder {
            silent: Silent,
            unclosed: Unclosed,
            after: 2,
        };
        assert_eq!(
            marshal_to_string(&holder),
            r#"{"silent":null,"unclosed":{"x":1},"after":2}"#
        );
        assert_eq!(marshal_to_string(&Silent), "null");
    }
}

mod dynamic {
    use super::*;

    #[test]
    fn boxed_values_dispatch_on_their_concrete_type() {
        let values: Vec<Box<dyn LogValue>> = vec![Box::new(1_u8), Box::new("a"), Box::new(None::<u8>)];
        assert_eq!(marshal_to_string(&values), r#"[1,"a",null]"#);
    }

    #[test]
    fn trait_objects_as_entry_points() {
        let value: &dyn LogValue = &vec![true];
        assert_eq!(marshal_to_string(value), "[true]");
        assert_eq!(LogJson::new().marshal_dyn(Some(value)), b"[true]");
    }

    #[test]
    fn boxed_errors() {
        let err: Box<dyn std::error::Error + Send + Sync> = "bad input".into();
        assert_eq!(marshal_to_string(&err), r#""bad input""#);
    }
}

mod entry_points {
    use super::*;

    #[derive(Loggable)]
    struct User {
        name: String,
    }

    #[test]
    fn marshal_with_encoder_embeds_values() {
        let mut encoder = Encoder::new();
        encoder.begin_object();
        encoder.write_str("user");
        LogJson::global().marshal_with_encoder(&User { name: "a".into() }, &mut encoder);
        encoder.end_object();
        assert_eq!(encoder.as_bytes(), b"{\"user\":{\"name\":\"a\"}}\n");
    }

    #[test]
    fn write_to_terminates_the_record() {
        let mut out = Vec::new();
        LogJson::new()
            .write_to(&User { name: "a".into() }, &mut out)
            .unwrap();
        assert_eq!(out, b"{\"name\":\"a\"}\n");
    }

    #[test]
    fn display_wrapper() {
        use logjson::LogJsonExt;

        let user = User { name: "a".into() };
        assert_eq!(user.log_json().to_string(), r#"{"name":"a"}"#);
        assert_eq!(format!("{:?}", user.log_json()), r#"{"name":"a"}"#);
    }
}
