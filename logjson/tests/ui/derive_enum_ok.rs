use logjson::{FieldRules, LogRule, Loggable};

#[derive(Loggable)]
#[log(field_rules)]
enum Event {
    Started,
    #[log(rename = "stopped")]
    Stopped {
        code: i32,
        #[log(digest)]
        reason: String,
    },
    Moved(u8, u8),
    Wrapped(Box<Event>),
}

impl FieldRules for Event {
    fn field_rule(field: &str) -> Option<LogRule> {
        (field == "reason").then_some(LogRule::Omit)
    }
}

#[derive(Loggable)]
enum Never {}

fn main() {
    let _ = logjson::marshal(&Event::Started);
    let _ = logjson::marshal(&Event::Wrapped(Box::new(Event::Moved(1, 2))));
    let _ = <Never as Loggable>::type_info();
}
