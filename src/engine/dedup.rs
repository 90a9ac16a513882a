use crate::lead::types::Lead;
use crate::store::KnownIdentitySet;
use std::collections::HashMap;

/// Leads whose name is not yet in the store.
///
/// Identity is the exact display name, so two different people sharing a
/// name are treated as one lead and only the first ever gets stored.
///
/// Duplicate names inside `fresh` collapse to one entry: the later card's
/// fields win, at the position where the name first appeared.
pub fn new_leads(fresh: Vec<Lead>, known: &KnownIdentitySet) -> Vec<Lead> {
    let mut out: Vec<Lead> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for lead in fresh {
        if known.contains(&lead.name) {
            continue;
        }
        match position.get(&lead.name) {
            Some(&i) => {
                tracing::debug!(name = %lead.name, "duplicate name in snapshot, keeping later card");
                out[i] = lead;
            }
            None => {
                position.insert(lead.name.clone(), out.len());
                out.push(lead);
            }
        }
    }
    out
}
