//! Helper macro for generating port error enums.
//!
//! Every variant carries a `message` describing the adapter failure, so
//! services can map variants onto domain errors without inspecting adapter
//! internals.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $display:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($display)]
                $variant { message: String },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build a `", stringify!($variant), "` error.")]
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant {
                            message: message.into(),
                        }
                    }
                }
            )*

            /// Adapter-supplied detail carried by the variant.
            pub fn message(&self) -> &str {
                match self {
                    $( Self::$variant { message } => message.as_str(), )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum ExamplePortError {
            Connection => "connection failed: {message}",
            QueryFailed => "query failed: {message}",
        }
    }

    #[test]
    fn constructors_use_snake_case_names() {
        let err = ExamplePortError::query_failed("syntax");
        assert_eq!(err, ExamplePortError::QueryFailed { message: "syntax".to_owned() });
        assert_eq!(err.to_string(), "query failed: syntax");
    }

    #[test]
    fn message_returns_variant_detail() {
        let err = ExamplePortError::connection(String::from("pool closed"));
        assert_eq!(err.message(), "pool closed");
    }
}
