//! Member Records

use kiosk::{
    ids::MemberId,
    members::{MISSING_ADDRESS, MemberSummary, NewMember, PostalAddress},
};

use crate::backend::{AddressBook, AddressRecord, ContactDetails, MemberRecord, NewMemberRequest};

fn first_non_blank<'a>(values: impl IntoIterator<Item = Option<&'a String>>) -> String {
    values
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Each address field is taken from the first of home, business and billing
/// that has it.
fn summary_address(book: &AddressBook) -> PostalAddress {
    let firsts = [
        book.home_address.first(),
        book.business_address.first(),
        book.billing_address.first(),
    ];

    let field = |pick: fn(&AddressRecord) -> Option<&String>| {
        first_non_blank(firsts.iter().map(|address| address.and_then(pick)))
    };

    PostalAddress {
        address_line: field(|a| a.address_line.as_ref()),
        city: field(|a| a.city.as_ref()),
        state: field(|a| a.state.as_ref()),
        country: field(|a| a.country.as_ref()),
        zipcode: field(|a| a.zipcode.as_ref()),
    }
}

pub(super) fn summary_from_record(record: &MemberRecord) -> MemberSummary {
    let name = match record.display_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!(
            "{} {}",
            record.first_name.as_deref().unwrap_or_default(),
            record.last_name.as_deref().unwrap_or_default()
        ),
    };

    let contact = &record.contact_details;

    MemberSummary {
        id: MemberId::new(record.sys_id),
        name,
        address: summary_address(&record.addresses).one_line(),
        email: first_non_blank([contact.personal_email.first(), contact.work_email.first()]),
        phone: first_non_blank([
            contact.home_phone.first(),
            contact.work_phone.first(),
            contact.cell_phone.first(),
        ]),
    }
}

pub(super) fn request_from_member(member: &NewMember) -> NewMemberRequest {
    let address = member.home_address();

    NewMemberRequest {
        first_name: member.first_name.clone(),
        last_name: member.last_name.clone(),
        display_name: member.display_name(),
        gender: member.gender.as_str().to_string(),
        contact_details: ContactDetails {
            personal_email: vec![member.email.clone()],
            home_phone: vec![member.phone_digits()],
            ..ContactDetails::default()
        },
        addresses: AddressBook {
            home_address: vec![AddressRecord {
                address_line: Some(address.address_line),
                city: Some(address.city),
                state: Some(address.state),
                country: Some(address.country),
                zipcode: Some(address.zipcode),
            }],
            ..AddressBook::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use kiosk::members::Gender;

    use super::*;

    fn address(line: &str, city: &str, zipcode: &str) -> AddressRecord {
        AddressRecord {
            address_line: Some(line.to_string()),
            city: Some(city.to_string()),
            zipcode: Some(zipcode.to_string()),
            ..AddressRecord::default()
        }
    }

    #[test]
    fn summary_falls_back_across_address_books_and_contacts() {
        let record = MemberRecord {
            sys_id: 42,
            display_name: None,
            first_name: Some("Asha".to_string()),
            last_name: Some("Rao".to_string()),
            addresses: AddressBook {
                home_address: Vec::new(),
                business_address: vec![address("45 Temple Rd", "Edison", "08817")],
                billing_address: Vec::new(),
            },
            contact_details: ContactDetails {
                work_email: vec!["asha@work.example".to_string()],
                cell_phone: vec!["7325550100".to_string()],
                ..ContactDetails::default()
            },
        };

        let summary = summary_from_record(&record);

        assert_eq!(summary.id, MemberId::new(42));
        assert_eq!(summary.name, "Asha Rao");
        assert_eq!(summary.address, "45 Temple Rd Edison   08817");
        assert_eq!(summary.email, "asha@work.example");
        assert_eq!(summary.phone, "7325550100");
    }

    #[test]
    fn summary_without_address_reads_not_available() {
        let record = MemberRecord {
            sys_id: 7,
            display_name: Some("Rao Asha".to_string()),
            first_name: None,
            last_name: None,
            addresses: AddressBook::default(),
            contact_details: ContactDetails::default(),
        };

        let summary = summary_from_record(&record);

        assert_eq!(summary.name, "Rao Asha");
        assert!(summary.address.starts_with(MISSING_ADDRESS));
        assert!(summary.email.is_empty());
    }

    #[test]
    fn registration_request_normalises_the_form() {
        let member = NewMember {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            display_name: None,
            gender: Gender::Female,
            email: "asha@example.org".to_string(),
            phone: "(732) 555-0100".to_string(),
            address: PostalAddress {
                address_line: "45 Temple Rd".to_string(),
                city: "Edison".to_string(),
                state: "NJ".to_string(),
                country: "US".to_string(),
                zipcode: "08817".to_string(),
            },
            apt_or_suite: Some("Apt 2".to_string()),
        };

        let request = request_from_member(&member);

        assert_eq!(request.display_name, "Rao Asha");
        assert_eq!(request.gender, "female");
        assert_eq!(request.contact_details.home_phone, vec!["7325550100"]);
        assert_eq!(
            request.addresses.home_address[0].address_line.as_deref(),
            Some("Apt 2, 45 Temple Rd")
        );
    }
}
