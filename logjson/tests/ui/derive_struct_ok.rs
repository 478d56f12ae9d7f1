use logjson::Loggable;

#[derive(serde::Serialize)]
struct Handle;

#[derive(Loggable, serde::Serialize)]
struct Meta {
    id: u32,
}

#[derive(Loggable, serde::Serialize)]
struct Account {
    #[serde(rename = "accountId")]
    account_id: u64,
    #[log(digest)]
    email: String,
    #[log(md5)]
    backup_email: Option<String>,
    #[log(omit)]
    handle: Handle,
    #[log(rename = "tags", omitempty)]
    labels: Vec<String>,
    #[log(flatten)]
    meta: Meta,
    r#ref: Option<Box<Account>>,
}

#[derive(Loggable)]
struct Pair(u8, #[log(omitempty)] String);

#[derive(Loggable)]
struct Id(u64);

#[derive(Loggable)]
struct Empty;

fn main() {
    let account = Account {
        account_id: 1,
        email: "a@b".into(),
        backup_email: None,
        handle: Handle,
        labels: Vec::new(),
        meta: Meta { id: 2 },
        r#ref: None,
    };
    let _ = logjson::marshal(&account);
    let _ = logjson::marshal(&Pair(1, String::new()));
    let _ = logjson::marshal(&Id(3));
    let _ = logjson::marshal(&Empty);
}
