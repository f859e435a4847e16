//! The closed set of dynamic configuration keys
//!
//! Every key carries its dotted document name, the hard-coded default (as the
//! text a setter would receive) and whether the local document may set it.
//! The set is declared once here and drives bulk loading, the runtime
//! `set_config` entry point and the setter table in the infrastructure layer.

use crate::constants::CLOUD_KEY_PREFIX;
use std::fmt;
use std::str::FromStr;

macro_rules! config_keys {
    ($( $(#[$doc:meta])* $variant:ident => ($name:expr, $default:expr, $file:expr) ),+ $(,)?) => {
        /// A declared configuration key
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ConfigKey {
            $( $(#[$doc])* $variant, )+
        }

        impl ConfigKey {
            /// All declared keys, in load order
            pub const ALL: &'static [ConfigKey] = &[ $( ConfigKey::$variant, )+ ];

            /// Dotted name as it appears in the document and remote payload
            pub const fn name(self) -> &'static str {
                match self {
                    $( ConfigKey::$variant => $name, )+
                }
            }

            /// Hard-coded default, in setter input form
            pub const fn default_value(self) -> &'static str {
                match self {
                    $( ConfigKey::$variant => $default, )+
                }
            }

            /// Whether the local document is allowed to set this key
            pub const fn file_sourceable(self) -> bool {
                match self {
                    $( ConfigKey::$variant => $file, )+
                }
            }
        }
    };
}

config_keys! {
    /// Plugin execution timeout in milliseconds
    PluginTimeoutMillis => ("plugin.timeout.millis", "100", true),
    /// Comma separated hook points to skip
    HooksIgnore => ("hooks.ignore", "", true),
    /// Path prefix of pages that receive the custom response script
    InjectUrlPrefix => ("inject.urlprefix", "", true),
    /// Encoding used to read request parameters early
    RequestParamEncoding => ("request.param_encoding", "", true),
    /// Maximum request body bytes kept for inspection
    BodyMaxBytes => ("body.maxbytes", "12288", true),
    /// Log backup days
    LogMaxBackup => ("log.maxbackup", "30", true),
    /// Maximum stack depth handed to plugins
    PluginMaxStack => ("plugin.maxstack", "100", true),
    /// Capacity of the shared verdict cache
    LruMaxSize => ("lru.max_size", "1024", true),
    /// Skip plugins for file hooks whose target does not exist
    PluginFilter => ("plugin.filter", "true", true),
    /// Minimum OGNL expression length passed to plugins
    OgnlMinLength => ("ognl.expression.minlength", "30", true),
    /// Row count that marks a slow query
    SqlSlowQueryMinRows => ("sql.slowquery.min_rows", "500", true),
    /// HTTP status returned when a request is blocked
    BlockStatusCode => ("block.status_code", "302", true),
    /// Debug verbosity, 0 disables
    DebugLevel => ("debug.level", "0", true),
    /// Detection algorithm configuration (JSON object)
    AlgorithmConfig => ("algorithm.config", "{}", false),
    /// Header carrying the real client address
    ClientIpHeader => ("clientip.header", "ClientIP", true),
    /// Redirect target for blocked HTML requests
    BlockRedirectUrl => ("block.redirect_url", "https://rasp.baidu.com/blocked/?request_id=%request_id%", true),
    /// Body returned for blocked JSON requests
    BlockContentJson => ("block.content_json", "{\"error\":true, \"reason\": \"Request blocked by OpenRASP\", \"request_id\": \"%request_id%\"}", true),
    /// Body returned for blocked XML requests
    BlockContentXml => ("block.content_xml", "<?xml version=\"1.0\"?><doc><error>true</error><reason>Request blocked by OpenRASP</reason><request_id>%request_id%</request_id></doc>", true),
    /// Body returned for blocked HTML requests
    BlockContentHtml => ("block.content_html", "</script><script>location.href=\"https://rasp.baidu.com/blocked2/?request_id=%request_id%\"</script>", true),
    /// Managed mode toggle
    CloudEnable => ("cloud.enable", "false", true),
    /// Control plane base URL
    CloudBackendUrl => ("cloud.backend_url", "", true),
    /// Control plane application id
    CloudAppId => ("cloud.app_id", "", true),
    /// Control plane application secret
    CloudAppSecret => ("cloud.app_secret", "", true),
    /// Agent identity id
    RaspId => ("rasp.id", "", true),
    /// Syslog forwarding toggle
    SyslogEnable => ("syslog.enable", "false", true),
    /// Syslog endpoint
    SyslogUrl => ("syslog.url", "", true),
    /// Syslog tag
    SyslogTag => ("syslog.tag", "OPENRASP", true),
    /// Syslog facility
    SyslogFacility => ("syslog.facility", "1", true),
    /// Syslog reconnect interval in milliseconds
    SyslogReconnectInterval => ("syslog.reconnect_interval", "300000", true),
    /// Log records per minute before throttling
    LogMaxBurst => ("log.maxburst", "100", true),
    /// Heartbeat interval in seconds
    HeartbeatInterval => ("cloud.heartbeat_interval", "90", true),
    /// Hook whitelist (structured section)
    HookWhite => ("hook.white", "", true),
    /// Whitelist applies to every hook
    HookWhiteAll => ("hook.white.ALL", "true", true),
    /// Bytecode decompilation for stack traces
    DecompileEnable => ("decompile.enable", "false", true),
    /// Extra response headers (structured section)
    ResponseHeaders => ("inject.custom_headers", "", true),
    /// CPU usage ceiling that trips the breaker
    CpuUsagePercent => ("cpu.usage.percent", "90", true),
    /// CPU breaker toggle
    CpuUsageEnable => ("cpu.usage.enable", "false", true),
    /// CPU sampling interval in seconds
    CpuUsageInterval => ("cpu.usage.interval", "5", true),
    /// TLS peer verification for control plane requests
    HttpsVerifyPeer => ("openrasp.ssl_verifypeer", "false", true),
    /// Cache verdicts by exact content instead of fingerprint
    LruCompareEnable => ("lru.compare_enable", "false", true),
    /// Longest content cached verbatim when compare is on
    LruCompareLimit => ("lru.compare_limit", "10240", true),
}

impl ConfigKey {
    /// Look a key up by its dotted name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.name() == name)
    }

    /// Keys that only the local document may set
    ///
    /// The remote source can never change them, and the runtime entry point
    /// refuses them too.
    pub fn bootstrap_only(self) -> bool {
        self == Self::RaspId || self.name().starts_with(CLOUD_KEY_PREFIX)
    }

    /// Keys parsed from a nested document section rather than a scalar
    pub fn is_structured(self) -> bool {
        matches!(self, Self::HookWhite | Self::ResponseHeaders)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            crate::error::Error::validation(s, "configuration item doesn't exist")
        })
    }
}
