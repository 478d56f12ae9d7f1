use std::{collections::HashMap, marker::PhantomData};

use logjson::Loggable;

struct NotLoggable;

#[derive(Loggable)]
struct Page<T> {
    items: Vec<T>,
    total: usize,
}

#[derive(Loggable)]
struct Typed<K, V, M> {
    lookup: HashMap<K, Vec<V>>,
    _marker: PhantomData<M>,
}

#[derive(Loggable)]
struct Holder<T> {
    #[log(omit)]
    hidden: T,
    visible: u8,
}

#[derive(Loggable)]
enum Either<L, R> {
    Left(L),
    Right(R),
}

#[derive(Loggable)]
struct Wrapper<T>(T);

fn main() {
    let _ = logjson::marshal(&Page { items: vec![1_u8], total: 1 });
    let typed: Typed<String, u8, NotLoggable> = Typed {
        lookup: HashMap::new(),
        _marker: PhantomData,
    };
    let _ = logjson::marshal(&typed);
    let _ = logjson::marshal(&Holder { hidden: NotLoggable, visible: 1 });
    let _ = logjson::marshal(&Either::<u8, String>::Left(1));
    let _ = logjson::marshal(&Wrapper(String::new()));
}
