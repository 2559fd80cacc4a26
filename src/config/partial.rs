//! Partial configs: every field optional, merged in layers, then validated
//! into the full config type.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// A partial config struct, which contains optional values of everything.
/// This is usually generated with the `PartialConfig` macro.
pub trait PartialConfig {
    /// Merges the values from `high` and `low`, where `high` takes precedence
    /// in the case of conflicts.
    fn merge(low: Self, high: Self) -> Self;

    /// Validates the final struct. All required values should exist.
    fn validate(self) -> Result<Self::Output, ValidationError>;

    /// The full config type, returned after validation.
    type Output;
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub fields: Vec<&'static str>,
    /// Path of the table holding the missing fields, outermost first.
    pub path: Vec<&'static str>,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing fields {:?}", self.fields)?;
        if !self.path.is_empty() {
            write!(f, " in [{}]", self.path.join("."))?;
        }
        Ok(())
    }
}
impl Error for ValidationError {}

macro_rules! PartialConfig {
    (
        #[derive_args($SourceStructName:ident)]
        $(#[$struct_meta:meta])*
        $struct_vis:vis
        struct $StructName:ident {
            $(
                $(#[$($field_meta:tt)*])*
                $field_vis:vis
                $field_name:ident: $field_ty:ty
            ),* $(,)?
        }
    ) => {
        PartialConfig!(
            @source(
                // Identifiers to be used in pushdown outputs, supplied here for
                // hygiene reasons.
                low, high, self, err
            ) [
                // Input struct and fields left to process.
                $(#[$struct_meta])*
                struct $StructName => $SourceStructName {
                    $( $(#[$($field_meta)*])* $field_name: $field_ty, )*
                }
            ] -> [
                // Pushdown outputs.
                []; []; []; []
            ]
        );
    };

    // Base case: All fields have been processed. Build the final definition.
    (@source($low:ident, $high:ident, $self:ident, $err:ident) [
        $(#[$struct_meta:meta])*
        struct $StructName:ident => $SourceStructName:ident { }
    ] -> [
        [ $($fields:tt)* ]; [ $($merge:tt)* ]; [ $($check:tt)* ]; [ $($validate:tt)* ]
    ]) => {
        $(#[$struct_meta])*
        // Every field is an Option or another partial struct.
        #[derive(Default)]
        #[serde(default)]
        struct $SourceStructName {
            $( $fields )*
        }

        impl PartialConfig for $SourceStructName {
            type Output = $StructName;

            fn merge($low: Self, $high: Self) -> Self {
                Self {
                    $( $merge )*
                }
            }

            fn validate($self) -> Result<$StructName, ValidationError> {
                #[allow(unused_mut)]
                let mut $err = ValidationError::default();
                $($check)*
                if !$err.fields.is_empty() {
                    return Err($err);
                }
                Ok($StructName {
                    $($validate)*
                })
            }
        }
    };

    // `#[derive_args(source)]` field case: Use the source field type.
    (@source($low:ident, $high:ident, $self:ident, $err:ident) [
        $(#[$struct_meta:meta])*
        struct $StructName:ident => $SourceStructName:ident {
            #[derive_args($source_field_ty:ident)]
            $(#[$($field_meta:tt)*])*
            $field_name:ident: $field_ty:ty,
            $($rest:tt)*
        }
    ] -> [
        [ $($fields:tt)* ]; [ $($merge:tt)* ]; [ $($check:tt)* ]; [ $($validate:tt)* ]
    ]) => {
        PartialConfig! {
            @source($low, $high, $self, $err) [
                $(#[$struct_meta])*
                struct $StructName => $SourceStructName { $($rest)* }
            ] -> [
                [
                    $($fields)*

                    $(#[$($field_meta)*])*
                    $field_name: $source_field_ty,
                ];
                [
                    $($merge)*
                    $field_name: <$source_field_ty as PartialConfig>::merge($low.$field_name, $high.$field_name),
                ];
                [
                    $($check)*
                    // Checking happens via the call to validate below.
                ];
                [
                    $($validate)*
                    $field_name: $self.$field_name.validate().map_err(|mut e| {
                        e.path.insert(0, stringify!($field_name));
                        e
                    })?,
                ]
            ]
        }
    };

    // Default field case: Wrap the field type in Option.
    (@source($low:ident, $high:ident, $self:ident, $err:ident) [
        $(#[$struct_meta:meta])*
        struct $StructName:ident => $SourceStructName:ident {
            $(#[$($field_meta:tt)*])*
            $field_name:ident: $field_ty:ty,

            $($rest:tt)*
        }
    ] -> [
        [ $($fields:tt)* ]; [ $($merge:tt)* ]; [ $($check:tt)* ]; [ $($validate:tt)* ]
    ]) => {
        PartialConfig! {
            @source($low, $high, $self, $err) [
                $(#[$struct_meta])*
                struct $StructName => $SourceStructName { $($rest)* }
            ] -> [
                [
                    $($fields)*

                    $(#[$($field_meta)*])*
                    $field_name: Option<$field_ty>,
                ];
                [
                    $($merge)*
                    $field_name: $high.$field_name.or($low.$field_name),
                ];
                [
                    $($check)*
                    if $self.$field_name.is_none() {
                        $err.fields.push(stringify!($field_name));
                    }
                ];
                [
                    $($validate)*
                    // Every field was checked for None above.
                    $field_name: $self.$field_name.unwrap(),
                ]
            ]
        }
    };
}

#[cfg(test)]
mod tests {
    use macro_rules_attribute::derive;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use test_log::test;

    use super::*;

    #[derive(PartialConfig!)]
    #[derive_args(OuterPartial)]
    #[derive(Deserialize, Debug, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Outer {
        #[serde(rename = "n")]
        number: u32,
        #[derive_args(InnerPartial)]
        inner: Inner,
    }

    #[derive(PartialConfig!)]
    #[derive_args(InnerPartial)]
    #[derive(Deserialize, Debug, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Inner {
        flag: bool,
        name: String,
    }

    fn parse(s: &str) -> OuterPartial {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn high_layer_wins_at_every_depth() {
        let low = parse("n = 1\n[inner]\nflag = false\nname = \"low\"");
        let high = parse("[inner]\nname = \"high\"");
        let merged = OuterPartial::merge(low, high).validate().unwrap();
        assert_eq!(
            merged,
            Outer {
                number: 1,
                inner: Inner { flag: false, name: "high".into() },
            }
        );
    }

    #[test]
    fn missing_fields_report_their_table() {
        let err = parse("n = 1\n[inner]\nflag = true").validate().unwrap_err();
        assert_eq!(err.fields, vec!["name"]);
        assert_eq!(err.path, vec!["inner"]);
        assert_eq!(err.to_string(), r#"missing fields ["name"] in [inner]"#);
    }

    #[test]
    fn field_attributes_carry_over() {
        assert!(toml::from_str::<OuterPartial>("number = 1").is_err());
    }
}
