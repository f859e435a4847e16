//! Detection check types and their whitelist codes
//!
//! Each detection category owns one bit of the suppression mask. Policy
//! checks (baseline/server hardening) carry code 0 and can never be
//! whitelisted.

use std::fmt;

macro_rules! check_types {
    ($( $variant:ident => ($name:expr, $code:expr) ),+ $(,)?) => {
        /// A category of detection rule
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum CheckType {
            $(
                #[allow(missing_docs)]
                $variant,
            )+
        }

        impl CheckType {
            /// Every declared check type
            pub const ALL: &'static [CheckType] = &[ $( CheckType::$variant, )+ ];

            /// Name used in whitelist documents
            pub const fn name(self) -> &'static str {
                match self {
                    $( CheckType::$variant => $name, )+
                }
            }

            /// Whitelist bit, 0 for checks that cannot be suppressed
            pub const fn code(self) -> u32 {
                match self {
                    $( CheckType::$variant => $code, )+
                }
            }
        }
    };
}

check_types! {
    Sqli => ("sqli", 1 << 0),
    Command => ("command", 1 << 1),
    Directory => ("directory", 1 << 2),
    Request => ("request", 1 << 3),
    ReadFile => ("readFile", 1 << 5),
    WriteFile => ("writeFile", 1 << 6),
    FileUpload => ("fileUpload", 1 << 7),
    Rename => ("rename", 1 << 8),
    Xxe => ("xxe", 1 << 9),
    Ognl => ("ognl", 1 << 10),
    Deserialization => ("deserialization", 1 << 11),
    Webdav => ("webdav", 1 << 12),
    Include => ("include", 1 << 13),
    Ssrf => ("ssrf", 1 << 14),
    SqlException => ("sql_exception", 1 << 15),
    RequestEnd => ("requestEnd", 1 << 17),
    DeleteFile => ("deleteFile", 1 << 18),
    Mongodb => ("mongodb", 1 << 19),
    LoadLibrary => ("loadLibrary", 1 << 20),
    SsrfRedirect => ("ssrfRedirect", 1 << 21),
    Response => ("response", 1 << 23),
    Link => ("link", 1 << 24),
    PolicyLog => ("policy_log", 0),
    PolicySqlConnection => ("policy_sql_connection", 0),
    PolicyMongoConnection => ("policy_mongo_connection", 0),
    PolicyServerTomcat => ("policy_server_tomcat", 0),
    PolicyServerWebsphere => ("policy_server_websphere", 0),
}

impl CheckType {
    /// Resolve a whitelist entry name, ignoring ASCII case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|check| check.name().eq_ignore_ascii_case(name))
    }

    /// Sum of every non-zero check code
    pub fn all_mask() -> u32 {
        Self::ALL
            .iter()
            .map(|check| check.code())
            .filter(|code| *code != 0)
            .sum()
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
