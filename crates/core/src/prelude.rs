//! Kiosk prelude.
//!
//! The types an application layer needs to drive a donation session.

pub use crate::{
    accounts::{AccountGroup, DonationAccount, OTHERS_GROUP_ID},
    alerts::{BlockedRange, SchedulingMetadata, WeekSchedule},
    cart::{Cart, CartLineItem, EntryId, LineItemUpdate, NewLineItem},
    idle::{IdleState, InactivityTimer},
    ids::{AccountId, GroupId, MemberId, PaymentId},
    manifest::{ManifestEntry, checkout_manifest, encode_manifest},
    members::{ContactMatch, Gender, MemberSummary, NewMember, PostalAddress},
    navigation::Route,
    payments::{CardDescriptor, PaymentIntentId, PaymentStatus, PendingCardPayment},
    validation::{Notice, ValidationError, ValidationErrors},
};
