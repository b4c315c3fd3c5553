/// Declares a protocol enum whose variants carry their wire values.
///
/// Generates the enum plus `Display`, `From<Enum> for u32` and a fallible
/// `TryFrom<u32>` that rejects values the protocol does not define.
#[macro_export]
macro_rules! wl_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant = $value,
            )*
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        $name::$variant => write!(f, "{}::{}", stringify!($name), stringify!($variant)),
                    )*
                }
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> u32 {
                value as u32
            }
        }

        impl TryFrom<u32> for $name {
            type Error = anyhow::Error;

            fn try_from(value: u32) -> anyhow::Result<Self> {
                match value {
                    $(
                        v if v == $value => Ok($name::$variant),
                    )*
                    _ => Err(anyhow::anyhow!("Invalid {} value: {}", stringify!($name), value)),
                }
            }
        }
    };
}
