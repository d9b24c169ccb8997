pub use kind_derive::*;

/// A type that implements `Kind` is capable of describing itself to outside systems,
/// typically by simply returning the name of its own type.
///
/// This is most easily accomplished by using the `Kind` derive macro.
///
/// ```
/// use kind::Kind;
///
/// #[derive(Kind)]
/// struct Sandbox {}
///
/// #[derive(Kind)]
/// enum SandboxEvent {
///     Created,
///     Destroyed(u32),
/// }
///
/// assert_eq!("Sandbox", Sandbox {}.kind());
/// assert_eq!("SandboxEvent::Created", SandboxEvent::Created.kind());
/// assert_eq!("SandboxEvent::Destroyed", SandboxEvent::Destroyed(42).kind());
/// ```
///
/// The derive macro does not work on unions. A blanket implementation exists for
/// `Vec<T>` where `T: Kind`, for which the result is `List[T::kind()]` (or `List[]`
/// for an empty vector).
pub trait Kind {
    fn kind(&self) -> String;
}

macro_rules! impl_kind {
    ($i:ident) => {
        impl Kind for $i {
            fn kind(&self) -> String {
                stringify!($i).to_string()
            }
        }
    };
    (()) => {
        impl Kind for () {
            fn kind(&self) -> String {
                stringify!(()).to_string()
            }
        }
    };
}

impl_kind!(());
impl_kind!(String);
impl_kind!(bool);
impl_kind!(u8);
impl_kind!(u16);
impl_kind!(u32);
impl_kind!(u64);
impl_kind!(u128);
impl_kind!(i8);
impl_kind!(i16);
impl_kind!(i32);
impl_kind!(i64);
impl_kind!(i128);
impl_kind!(f32);
impl_kind!(f64);

impl<T> Kind for Vec<T>
where
    T: Kind,
{
    fn kind(&self) -> String {
        if self.is_empty() {
            "List[]".to_string()
        } else {
            format!("List[{}]", self.first().unwrap().kind())
        }
    }
}

#[cfg(test)]
#[allow(dead_code)]
mod tests {
    use super::*;

    #[test]
    fn simple_struct() {
        #[derive(Kind)]
        struct Lol {}
        assert_eq!(Lol {}.kind(), "Lol")
    }

    #[test]
    fn unit() {
        #[derive(Kind)]
        enum AnEnum {
            Variant,
        }
        assert_eq!(AnEnum::Variant.kind(), "AnEnum::Variant")
    }

    #[test]
    fn unary_unnamed() {
        #[derive(Kind)]
        enum AnEnum {
            Variant(i32),
        }
        assert_eq!(AnEnum::Variant(1).kind(), "AnEnum::Variant")
    }

    #[test]
    fn mixed_enum() {
        #[derive(Kind)]
        enum AnEnum {
            Unit,
            UnaryUnnamed(i32),
            BinaryNamed { a: i32, b: i32 },
        }
        assert_eq!(AnEnum::Unit.kind(), "AnEnum::Unit");
        assert_eq!(AnEnum::UnaryUnnamed(1).kind(), "AnEnum::UnaryUnnamed");
        assert_eq!(
            AnEnum::BinaryNamed { a: 1, b: 2 }.kind(),
            "AnEnum::BinaryNamed"
        );
    }

    #[test]
    fn empty_vec() {
        let v: Vec<String> = vec![];
        assert_eq!(v.kind(), "List[]");
    }

    #[test]
    fn nonempty_vec() {
        let v: Vec<String> = vec!["a".to_string()];
        assert_eq!(v.kind(), "List[String]");
    }
}
