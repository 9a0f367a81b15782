use clap::Args;
use kiosk::members::{ContactMatch, mask_address, mask_email};
use kiosk_app::context::KioskContext;

#[derive(Debug, Args)]
pub(crate) struct SearchArgs {
    /// Email address or phone number
    term: String,
}

pub(crate) async fn run(context: &KioskContext, args: SearchArgs) -> Result<(), String> {
    let matches = context
        .members
        .search_by_contact(&args.term)
        .await
        .map_err(|error| format!("member search failed: {error}"))?;

    if matches.is_empty() {
        println!("no members found");
    }

    for (member, matched) in matches {
        let matched = match matched {
            ContactMatch::Email => "email",
            ContactMatch::Phone => "phone",
        };

        println!(
            "{}\t{}\t{}\t{}\t(matched {matched})",
            member.id,
            member.name,
            mask_email(&member.email),
            mask_address(&member.address),
        );
    }

    Ok(())
}
