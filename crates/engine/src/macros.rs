/// Declares a fieldless enum persisted as a snake_case string column.
///
/// Generates `as_str`, `TryFrom<&str>` (rejecting unknown values with
/// `EngineError::Validation`) and `Display`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = crate::EngineError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(crate::EngineError::Validation(format!(
                        concat!("invalid ", stringify!($name), ": {}"),
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;
