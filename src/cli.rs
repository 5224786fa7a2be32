use crate::services::config::CliOverrides;
use clap::Parser;

/// MCP server for the Facebook Marketing API.
#[derive(Parser, Debug, Default)]
#[command(name = "fb-ads-mcp", version, about)]
pub struct Cli {
    /// Access token used when MCP_CONFIG carries none
    #[arg(long, value_name = "TOKEN", num_args = 0..=1)]
    pub fb_token: Option<Option<String>>,

    /// Default ad account (act_<ID> or numeric id)
    #[arg(long, value_name = "ID", num_args = 0..=1)]
    pub default_act_id: Option<Option<String>>,

    /// Display name of the default ad account
    #[arg(long, value_name = "NAME", num_args = 0..=1)]
    pub default_act_name: Option<Option<String>>,

    /// Serve over HTTP instead of stdio
    #[arg(long)]
    pub http: bool,

    /// HTTP port; implies --http
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            fb_token: self.fb_token.clone(),
            default_act_id: self.default_act_id.clone(),
            default_act_name: self.default_act_name.clone(),
        }
    }

    pub fn wants_http(&self) -> bool {
        self.http || self.port.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_flags_stay_none() {
        let cli = Cli::try_parse_from(["fb-ads-mcp"]).expect("parse");
        assert_eq!(cli.overrides(), CliOverrides::default());
        assert!(!cli.wants_http());
    }

    #[test]
    fn flag_without_value_is_representable() {
        let cli = Cli::try_parse_from(["fb-ads-mcp", "--fb-token", "--default-act-id", "123"])
            .expect("parse");
        assert_eq!(cli.fb_token, Some(None));
        assert_eq!(cli.default_act_id, Some(Some("123".to_string())));
        assert_eq!(cli.default_act_name, None);
    }

    #[test]
    fn port_implies_http() {
        let cli = Cli::try_parse_from(["fb-ads-mcp", "--port", "9000"]).expect("parse");
        assert!(cli.wants_http());
        assert_eq!(cli.port, Some(9000));
    }
}
