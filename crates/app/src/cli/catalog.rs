use clap::Args;
use kiosk::ids::GroupId;
use kiosk_app::context::KioskContext;

#[derive(Debug, Args)]
pub(crate) struct CatalogArgs {
    /// Group whose accounts should be listed
    #[arg(long)]
    group: Option<GroupId>,
}

pub(crate) async fn run(context: &KioskContext, args: CatalogArgs) -> Result<(), String> {
    let Some(group) = args.group else {
        let groups = context
            .catalog
            .list_groups()
            .await
            .map_err(|error| format!("failed to list groups: {error}"))?;

        for group in groups {
            println!("{}\t{}\t{}", group.id, group.name, group.description);
        }

        return Ok(());
    };

    let accounts = context
        .catalog
        .list_accounts(group)
        .await
        .map_err(|error| format!("failed to list accounts: {error}"))?;

    for account in accounts {
        let price = if account.is_alert {
            format!("alert {}", account.alert_fee())
        } else {
            "open amount".to_string()
        };

        println!("{}\t{}\t{price}", account.id, account.name);
    }

    Ok(())
}
