use std::{num::ParseIntError, str::FromStr};

use clap::Args;
use jiff::{Timestamp, Zoned, civil::Date};
use kiosk::{
    members::MemberSummary,
    prelude::{AccountId, MemberId, NewLineItem, PaymentId, Route},
    validation::validate_line_item,
};
use kiosk_app::{
    checkout::{
        AttributionResult, CancelHandle, CheckoutObserver, CheckoutOutcome, CheckoutState,
        CompletedCheckout, cancellation,
    },
    config::KioskConfig,
    context::KioskContext,
    domain::members::{MembersService, MembersServiceError},
};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::{signal, task::JoinHandle};
use tracing::{debug, info, warn};

use super::session;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Cart line as ACCOUNT=AMOUNT, or ACCOUNT=AMOUNT@YYYY-MM-DD for alerts
    #[arg(long = "item", required = true)]
    items: Vec<ItemArg>,

    /// Member to attribute the donation to
    #[arg(long, conflicts_with = "anonymous")]
    member: Option<MemberId>,

    /// Attribute the donation to the anonymous member
    #[arg(long)]
    anonymous: bool,
}

/// One `--item` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ItemArg {
    account: AccountId,
    amount: Decimal,
    alert_date: Option<Date>,
}

#[derive(Debug, Error)]
pub(crate) enum ItemArgError {
    #[error("expected ACCOUNT=AMOUNT[@YYYY-MM-DD], got `{0}`")]
    Shape(String),

    #[error("invalid account id: {0}")]
    Account(#[source] ParseIntError),

    #[error("invalid amount: {0}")]
    Amount(#[source] rust_decimal::Error),

    #[error("invalid date: {0}")]
    Date(#[source] jiff::Error),
}

impl FromStr for ItemArg {
    type Err = ItemArgError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (account, rest) = value
            .split_once('=')
            .ok_or_else(|| ItemArgError::Shape(value.to_string()))?;

        let (amount, alert_date) = match rest.split_once('@') {
            Some((amount, date)) => (amount, Some(date)),
            None => (rest, None),
        };

        let account = account.parse::<AccountId>().map_err(ItemArgError::Account)?;
        let amount = amount.trim().parse::<Decimal>().map_err(ItemArgError::Amount)?;

        let alert_date = alert_date
            .map(|date| date.trim().parse::<Date>().map_err(ItemArgError::Date))
            .transpose()?;

        Ok(Self {
            account,
            amount,
            alert_date,
        })
    }
}

/// Prints operator messages as the checkout progresses.
struct ConsoleObserver;

impl CheckoutObserver for ConsoleObserver {
    fn on_state(&mut self, state: CheckoutState) {
        debug!(?state, "checkout state");
    }

    fn on_message(&mut self, message: &str) {
        println!("{message}");
    }
}

fn cancel_on_ctrl_c(handle: CancelHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        while signal::ctrl_c().await.is_ok() {
            info!("ctrl_c signal received");

            handle.cancel();
        }
    })
}

pub(crate) async fn run(
    context: &mut KioskContext,
    config: &KioskConfig,
    args: CheckoutArgs,
) -> Result<(), String> {
    session::prepare_checkout(context, config).await?;

    context.navigate(Route::SelectAccounts, Timestamp::now());

    fill_cart(context, &args.items).await?;

    context.navigate(Route::Cart, Timestamp::now());

    println!("total: {}", context.cart.total());

    let (handle, signal) = cancellation();
    let listener = cancel_on_ctrl_c(handle);

    let outcome = context
        .checkout
        .run(&context.cart, &signal, &mut ConsoleObserver)
        .await;

    listener.abort();

    let outcome = outcome.map_err(|error| format!("checkout failed: {error}"))?;

    match outcome {
        CheckoutOutcome::NotStarted => println!("cart is empty; nothing to charge"),
        CheckoutOutcome::Failed { message } => return Err(message),
        CheckoutOutcome::Canceled => {}
        CheckoutOutcome::Completed(completed) => {
            report_submissions(&completed);

            context.navigate(Route::SelectMember, Timestamp::now());

            attribute(context, &args, &completed).await?;
        }
    }

    context.navigate(Route::Start, Timestamp::now());

    Ok(())
}

async fn fill_cart(context: &mut KioskContext, items: &[ItemArg]) -> Result<(), String> {
    let accounts = context
        .catalog
        .account_index()
        .await
        .map_err(|error| format!("failed to load donation accounts: {error}"))?;

    let now = Zoned::now().datetime();

    for item in items {
        let account = accounts
            .get(&item.account)
            .ok_or_else(|| format!("unknown donation account {}", item.account))?;

        validate_line_item(account, Some(item.amount), item.alert_date.is_some())
            .map_err(|error| format!("{}: {error}", account.name))?;

        if let Some(date) = item.alert_date
            && account.is_alert
        {
            let blocked = context
                .catalog
                .blocked_ranges(account.id)
                .await
                .map_err(|error| format!("failed to load blocked days: {error}"))?;

            if !account.schedule.permits(date, now, &blocked) {
                return Err(format!("{}: {date} is not available", account.name));
            }
        }

        context.cart.add_item(NewLineItem::from_account(
            account,
            item.amount,
            item.alert_date,
        ));
        context.record_activity(Timestamp::now());
    }

    Ok(())
}

fn report_submissions(completed: &CompletedCheckout) {
    println!("charge: {} {}", completed.charge_id, completed.card);

    for failure in completed.submissions.failures() {
        println!(
            "account {} was not recorded: {}",
            failure.account_id,
            failure.error.as_deref().unwrap_or_default()
        );
    }
}

/// Who paid, judged from the card used.
#[derive(Debug, PartialEq, Eq)]
enum CardDonor {
    Unknown,
    Recognized(MemberSummary),
    Ambiguous(Vec<MemberSummary>),
}

async fn card_donor(
    members: &dyn MembersService,
    fingerprint: Option<&str>,
) -> Result<CardDonor, MembersServiceError> {
    let Some(fingerprint) = fingerprint else {
        return Ok(CardDonor::Unknown);
    };

    let mut matches = members.search_by_fingerprint(fingerprint).await?;

    Ok(match matches.len() {
        0 => CardDonor::Unknown,
        1 => CardDonor::Recognized(matches.remove(0)),
        _ => CardDonor::Ambiguous(matches),
    })
}

fn leave_on_placeholder(payment_ids: &[PaymentId]) {
    let ids: Vec<String> = payment_ids.iter().map(ToString::to_string).collect();

    println!("payments left on the placeholder member: {}", ids.join(", "));
}

async fn attribute(
    context: &KioskContext,
    args: &CheckoutArgs,
    completed: &CompletedCheckout,
) -> Result<(), String> {
    let payment_ids = completed.payment_ids();
    let fingerprint = completed.card_fingerprint.as_deref();

    let results = if let Some(member) = args.member {
        context
            .attribution
            .attribute(&payment_ids, member, fingerprint)
            .await
    } else if args.anonymous {
        context
            .attribution
            .attribute_anonymously(&payment_ids)
            .await
            .map_err(|error| error.to_string())?
    } else {
        match card_donor(context.members.as_ref(), fingerprint).await {
            Ok(CardDonor::Recognized(donor)) => {
                println!("card recognized: {} ({})", donor.name, donor.id);

                context
                    .attribution
                    .attribute(&payment_ids, donor.id, fingerprint)
                    .await
            }
            Ok(CardDonor::Ambiguous(matches)) => {
                for candidate in &matches {
                    println!(
                        "card used by member {}: {} {}",
                        candidate.id, candidate.name, candidate.email
                    );
                }

                leave_on_placeholder(&payment_ids);

                return Ok(());
            }
            Ok(CardDonor::Unknown) => {
                leave_on_placeholder(&payment_ids);

                return Ok(());
            }
            Err(error) => {
                warn!(%error, "card fingerprint lookup failed");

                leave_on_placeholder(&payment_ids);

                return Ok(());
            }
        }
    };

    print_attribution(&results);

    Ok(())
}

fn print_attribution(results: &[AttributionResult]) {
    for result in results {
        if result.success {
            println!("payment {} attributed", result.payment_id);
        } else {
            println!(
                "payment {} not attributed ({}): {}",
                result.payment_id,
                result.status,
                result.error.as_deref().unwrap_or("rejected")
            );
        }
    }
}
