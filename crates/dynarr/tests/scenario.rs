//! Integration test: the reference insert / iterate / clear walkthrough.

use dynarr::DynArray;

/// Builds a string from the first `len` bytes of `text`.
struct Prefix<'a>(&'a str, usize);

impl From<Prefix<'_>> for String {
    fn from(Prefix(text, len): Prefix<'_>) -> Self {
        text[..len].to_owned()
    }
}

#[test]
fn insert_iterate_clear() {
    let mut v: DynArray<String> = DynArray::new();
    assert_eq!((v.len(), v.capacity()), (0, 0));

    v.emplace("hello");
    assert_eq!((v.len(), v.capacity()), (1, 1));

    let second = v.emplace(Prefix("hello world", 5));
    assert_eq!(second, "hello");
    assert_eq!((v.len(), v.capacity()), (2, 3));

    v.emplace_default();
    assert_eq!((v.len(), v.capacity()), (3, 3));

    let seen: Vec<&str> = v.iter().map(String::as_str).collect();
    assert_eq!(seen, ["hello", "hello", ""]);

    v.clear();
    assert_eq!(v.len(), 0);
    assert!(v.is_empty());
    assert_eq!(v.capacity(), 3);
}

#[test]
fn for_loops_visit_in_insertion_order() {
    let mut v: DynArray<u32> = DynArray::new();
    for i in 1..=5 {
        v.push(i * 10);
    }

    let mut order = Vec::new();
    for x in &v {
        order.push(*x);
    }
    assert_eq!(order, [10, 20, 30, 40, 50]);

    for x in &mut v {
        *x += 1;
    }
    let owned: Vec<u32> = v.into_iter().collect();
    assert_eq!(owned, [11, 21, 31, 41, 51]);
}
