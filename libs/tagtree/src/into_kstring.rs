//! The string-like (and integer) types accepted for attribute names,
//! attribute values and text node contents.

use std::borrow::Cow;

use kstring::KString;

pub trait IntoKString {
    fn into_kstring(self) -> KString;
}

impl IntoKString for KString {
    fn into_kstring(self) -> KString {
        self
    }
}

impl IntoKString for &KString {
    fn into_kstring(self) -> KString {
        self.clone()
    }
}

impl IntoKString for String {
    fn into_kstring(self) -> KString {
        KString::from_string(self)
    }
}

impl IntoKString for Cow<'_, str> {
    fn into_kstring(self) -> KString {
        match self {
            Cow::Borrowed(s) => KString::from_ref(s),
            Cow::Owned(s) => KString::from_string(s),
        }
    }
}

macro_rules! impl_by_deref {
    ($($t:ty),*) => {
        $(
            impl IntoKString for $t {
                fn into_kstring(self) -> KString {
                    KString::from_ref(&**self)
                }
            }
        )*
    }
}

impl_by_deref!(&String, &&str, &Box<str>);

impl IntoKString for &str {
    fn into_kstring(self) -> KString {
        KString::from_ref(self)
    }
}

macro_rules! impl_by_display {
    ($($t:ty),*) => {
        $(
            impl IntoKString for $t {
                fn into_kstring(self) -> KString {
                    KString::from_string(self.to_string())
                }
            }
        )*
    }
}

impl_by_display!(u32, u64, usize, i32, i64);


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_into_kstring() {
        let s = String::from("owned");
        assert_eq!((&s).into_kstring().as_str(), "owned");
        assert_eq!((&"ref").into_kstring().as_str(), "ref");
        assert_eq!(Cow::Borrowed("cow").into_kstring().as_str(), "cow");
        assert_eq!(45usize.into_kstring().as_str(), "45");
        assert_eq!((-3i64).into_kstring().as_str(), "-3");
        assert_eq!(s.into_kstring().as_str(), "owned");
    }
}
