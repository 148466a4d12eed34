/// Configuration macros for single-declaration config definitions
///
/// `config_struct!` defines a configuration structure with its defaults
/// inline, so the TOML schema, the field types and the defaults never drift.

/// Define a configuration struct with embedded defaults
///
/// Generates:
/// - the struct with public fields
/// - a `Default` implementation using the given values
/// - Serde support with `#[serde(default)]`, so partial TOML files load
///
/// # Example
/// ```ignore
/// config_struct! {
///     pub struct AlertsConfig {
///         spike_threshold: f64 = 0.50,
///         average_window_days: i64 = 7,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
