// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use recordscope_app::RawRow;

use crate::Store;

const ACCOUNT_FIELDS: [&str; 10] = [
    "Id",
    "Name",
    "Industry",
    "Type",
    "Status",
    "Phone",
    "Website",
    "BillingCity",
    "AnnualRevenue__c",
    "Account_Owner__r",
];

#[rustfmt::skip]
const ACCOUNTS: [[&str; 10]; 8] = [
    ["001A", "Acme Corp", "Tech", "Customer", "Active", "555-0100", "acme.example", "Austin", "1200000", "Avery Walker"],
    ["001B", "Globex", "Tech", "Prospect", "Closed", "555-0101", "globex.example", "Seattle", "870000", "Jordan Martin"],
    ["001C", "Initech", "Retail", "Customer", "Active", "555-0102", "initech.example", "Denver", "450000", "Taylor Hill"],
    ["001D", "Umbrella Health", "Healthcare", "Partner", "Pending", "555-0103", "", "Madison", "", "Riley Evans"],
    ["001E", "Hooli", "Tech", "Customer", "Active", "555-0104", "hooli.example", "Raleigh", "3100000", "Morgan Lopez"],
    ["001F", "Stark Supply", "Manufacturing", "Prospect", "Closed", "", "stark.example", "Pittsburgh", "990000", "Casey Gray"],
    ["001G", "Wayne Freight", "Logistics", "Customer", "Active", "555-0106", "wayne.example", "Portland", "2250000", "Alex Ward"],
    ["001H", "Soylent Foods", "Retail", "Partner", "Pending", "555-0107", "soylent.example", "Boise", "310000", "Quinn Young"],
];

const CONTACT_FIELDS: [&str; 6] = ["Id", "Name", "Email", "Phone", "Title", "Account__r"];

#[rustfmt::skip]
const CONTACTS: [[&str; 6]; 5] = [
    ["003A", "Parker Diaz", "parker@acme.example", "555-0200", "CTO", "Acme Corp"],
    ["003B", "Drew Reed", "drew@globex.example", "555-0201", "Buyer", "Globex"],
    ["003C", "Kai Campbell", "kai@initech.example", "", "Analyst", "Initech"],
    ["003D", "Elliot Turner", "elliot@hooli.example", "555-0203", "VP Sales", "Hooli"],
    ["003E", "Robin Flores", "", "555-0204", "Office Manager", "Wayne Freight"],
];

pub(crate) fn seed(store: &Store) -> Result<()> {
    seed_type(store, "Account", &ACCOUNT_FIELDS, &ACCOUNTS)?;
    seed_type(store, "Contact", &CONTACT_FIELDS, &CONTACTS)?;
    Ok(())
}

fn seed_type<const N: usize>(
    store: &Store,
    object_type: &str,
    fields: &[&str; N],
    rows: &[[&str; N]],
) -> Result<()> {
    store.create_object_type(object_type, fields)?;
    for values in rows {
        let row = fields
            .iter()
            .zip(values)
            .map(|(field, value)| {
                let value = (!value.is_empty()).then(|| (*value).to_owned());
                (*field, value)
            })
            .collect::<RawRow>();
        store.insert_record(object_type, &row)?;
    }
    Ok(())
}
