//! Supplier, customer, agent and carrier extraction.

use tracing::debug;

use super::layout::{find_address, parse_postal_line};
use super::rules::patterns::{
    ADDRESS_LINE, AGENT, CARRIER, CONTACT, CUSTOMER_CODE, CUSTOMER_NAME, FISCAL_CODE, POSTAL_LINE,
    TAX_LABEL,
};
use super::rules::{FieldExtractor, TaxIdExtractor};
use crate::models::{Agent, Customer, Supplier, SupplierProfile};

/// Lines before the supplier tax id searched for its name and address.
const SUPPLIER_HEADER_LINES: usize = 5;

/// Lines after the customer name searched for its address.
const CUSTOMER_BLOCK_LINES: usize = 6;

/// Extracts the parties named on a document.
#[derive(Debug, Clone, Default)]
pub struct PartyExtractor {
    profiles: Vec<SupplierProfile>,
    tax_ids: TaxIdExtractor,
}

impl PartyExtractor {
    pub fn new(profiles: Vec<SupplierProfile>) -> Self {
        Self {
            profiles,
            tax_ids: TaxIdExtractor::new(),
        }
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.tax_ids = self.tax_ids.with_validation(validate);
        self
    }

    /// Tax ids of the known suppliers.
    pub fn known_tax_ids(&self) -> impl Iterator<Item = &str> {
        self.profiles
            .iter()
            .map(|p| p.tax_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Supplier from a known profile when its marker occurs in `lowered`,
    /// otherwise from the block around the first tax id.
    pub fn supplier(&self, text: &str, lowered: &str) -> Supplier {
        if let Some(profile) = self
            .profiles
            .iter()
            .find(|p| !p.marker.is_empty() && lowered.contains(&p.marker.to_lowercase()))
        {
            debug!("Known supplier profile '{}' matched", profile.marker);
            return Supplier {
                name: profile.name.clone(),
                tax_id: profile.tax_id.clone(),
                address: profile.address.clone(),
                postal_code: profile.postal_code.clone(),
                city: profile.city.clone(),
                province: profile.province.clone(),
            };
        }

        self.generic_supplier(text)
    }

    fn generic_supplier(&self, text: &str) -> Supplier {
        let Some(tax_id) = self.tax_ids.extract(text) else {
            return Supplier::default();
        };

        let mut supplier = Supplier {
            tax_id: tax_id.value,
            ..Supplier::default()
        };

        let offset = tax_id.position.map(|(start, _)| start).unwrap_or(0);
        let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let header: Vec<&str> = text[..line_start]
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let header = &header[header.len().saturating_sub(SUPPLIER_HEADER_LINES)..];

        if let Some(name) = header.iter().rev().find(|l| is_name_line(l)) {
            supplier.name = name.to_string();
        }

        if let Some(street) = header.iter().find(|l| ADDRESS_LINE.is_match(l)) {
            supplier.address = strip_contacts(street);
        }

        if let Some((postal_code, city, province)) =
            header.iter().find_map(|l| parse_postal_line(l))
        {
            supplier.postal_code = postal_code;
            supplier.city = city;
            supplier.province = province;
        }

        debug!("Generic supplier: '{}' ({})", supplier.name, supplier.tax_id);
        supplier
    }

    /// Customer block: name, code, address, tax id and fiscal code.
    ///
    /// The tax id is the first one after the customer name that is neither
    /// `supplier_tax_id` nor a known supplier's.
    pub fn customer(&self, text: &str, supplier_tax_id: &str) -> Customer {
        let mut customer = Customer {
            code: CUSTOMER_CODE.first(text),
            fiscal_code: FISCAL_CODE.first(text).to_uppercase(),
            ..Customer::default()
        };

        let mut block_start = 0;
        if let Some(name) = CUSTOMER_NAME.extract(text) {
            customer.name = name.value;
            block_start = name.position.map(|(_, end)| end).unwrap_or(0);
        }

        let after_name = &text[block_start..];
        if !customer.name.is_empty() {
            let block: Vec<&str> = after_name
                .lines()
                .skip(1)
                .filter(|l| !l.trim().is_empty())
                .take(CUSTOMER_BLOCK_LINES)
                .collect();
            if let Some((printed, parts)) = find_address(&block) {
                customer.address = printed;
                customer.postal_code = parts.postal_code;
                customer.city = parts.city;
                customer.province = parts.province;
            }
        }

        let mut excluded: Vec<String> = self.known_tax_ids().map(str::to_string).collect();
        if !supplier_tax_id.is_empty() {
            excluded.push(supplier_tax_id.to_string());
        }
        if let Some(tax_id) = self.tax_ids.clone().excluding(excluded).extract(after_name) {
            customer.tax_id = tax_id.value;
        }

        customer
    }

    /// Agent code and name, both or neither.
    pub fn agent(&self, text: &str) -> Agent {
        AGENT
            .captures(text)
            .and_then(|(_, caps)| Agent::pair(&caps[1], &caps[2]))
            .unwrap_or_default()
    }

    pub fn carrier(&self, text: &str) -> String {
        CARRIER.first(text)
    }
}

/// A plausible company name: long enough, not just digits and separators,
/// and not an address, postal, contact or tax-id line.
fn is_name_line(line: &str) -> bool {
    line.chars().count() > 10
        && line.chars().any(char::is_alphabetic)
        && !ADDRESS_LINE.is_match(line)
        && !POSTAL_LINE.is_match(line)
        && !CONTACT.is_match(line)
        && !TAX_LABEL.is_match(line)
}

/// Street part of a header line that also carries phone/fax details.
fn strip_contacts(line: &str) -> String {
    let end = CONTACT.find(line).map(|m| m.start()).unwrap_or(line.len());
    line[..end].trim().trim_end_matches(['-', ',']).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractionConfig;

    const GENERIC: &str = "\
ROSSI DISTRIBUZIONE S.R.L.
Via Roma 12 - Tel. 011 123456
10121 TORINO (TO)
P.IVA E C.F.
01234567897
DDT n. 88 del 12/05/2024
Cliente: BIANCHI ALIMENTARI SNC
Corso Francia 5
10143 TORINO TO
P.IVA: 04064060041
Agente: 12 VERDI MARIO
Vettore: MITTENTE
";

    fn extractor() -> PartyExtractor {
        PartyExtractor::new(ExtractionConfig::default().known_suppliers)
    }

    #[test]
    fn test_known_profile() {
        let text = "ALFIERI SPECIALITA' ALIMENTARI S.P.A.\nP.IVA E C.F. 03247720042";
        let supplier = extractor().supplier(text, &text.to_lowercase());
        assert_eq!(supplier.tax_id, "03247720042");
        assert_eq!(supplier.city, "MAGLIANO ALFIERI");
    }

    #[test]
    fn test_generic_supplier() {
        let text = GENERIC.replace("P.IVA E C.F.\n", "P.IVA ");
        let supplier = extractor().supplier(&text, &text.to_lowercase());
        assert_eq!(supplier.tax_id, "01234567897");
        assert_eq!(supplier.name, "ROSSI DISTRIBUZIONE S.R.L.");
        assert_eq!(supplier.address, "Via Roma 12");
        assert_eq!(supplier.postal_code, "10121");
        assert_eq!(supplier.city, "TORINO");
        assert_eq!(supplier.province, "TO");
    }

    #[test]
    fn test_generic_supplier_skips_partial_label_line() {
        let supplier = extractor().supplier(GENERIC, &GENERIC.to_lowercase());
        assert_eq!(supplier.tax_id, "01234567897");
        assert_eq!(supplier.name, "ROSSI DISTRIBUZIONE S.R.L.");
    }

    #[test]
    fn test_customer_block() {
        let customer = extractor().customer(GENERIC, "01234567897");
        assert_eq!(customer.name, "BIANCHI ALIMENTARI SNC");
        assert_eq!(customer.address, "Corso Francia 5 10143 TORINO TO");
        assert_eq!(customer.postal_code, "10143");
        assert_eq!(customer.city, "TORINO");
        assert_eq!(customer.province, "TO");
        assert_eq!(customer.tax_id, "04064060041");
    }

    #[test]
    fn test_agent_and_carrier() {
        let parties = extractor();
        assert_eq!(
            parties.agent(GENERIC),
            Agent {
                code: "12".to_string(),
                name: "VERDI MARIO".to_string()
            }
        );
        assert_eq!(parties.carrier(GENERIC), "MITTENTE");
        assert_eq!(parties.agent("Agente: VERDI"), Agent::default());
    }
}
