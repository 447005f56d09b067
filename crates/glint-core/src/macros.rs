/// Declare an enum that serializes as one of glTF's numeric GL codes.
macro_rules! gl_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $what:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "u32", into = "u32")]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// The GL code written to JSON.
            pub const fn code(self) -> u32 {
                match self {
                    $( Self::$variant => $code, )+
                }
            }
        }

        impl TryFrom<u32> for $name {
            type Error = String;

            fn try_from(code: u32) -> ::core::result::Result<Self, String> {
                match code {
                    $( $code => Ok(Self::$variant), )+
                    other => Err(format!("unknown {} {}", $what, other)),
                }
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> u32 {
                value.code()
            }
        }
    };
}
