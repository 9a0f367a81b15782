use clap::Args;

#[derive(Debug, Args)]
pub struct OperatorConfig {
    /// Operator PIN
    #[arg(long, env = "KIOSK_PIN", hide_env_values = true)]
    pub pin: Option<String>,

    /// Card reader to take payments on
    #[arg(long, env = "KIOSK_READER")]
    pub reader: Option<String>,
}
