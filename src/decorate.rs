//! Header and footer content for a single page.

use crate::model::CatalogueSettings;

/// Drawing instructions for one page's header and footer bands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDecoration {
    pub page_number: usize,
    pub header: HeaderBand,
    pub footer: FooterBand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBand {
    /// Left-aligned.
    pub branding: String,
    /// Right-aligned.
    pub page_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterBand {
    /// Always three columns; a column may be empty.
    pub columns: [Vec<String>; 3],
    pub copyright: String,
}

/// Decoration for `page_number` (1-based). The same rule applies to every page.
pub fn decorate(page_number: usize, settings: &CatalogueSettings) -> PageDecoration {
    let company = settings.company_name.trim();

    PageDecoration {
        page_number,
        header: HeaderBand {
            branding: company.to_string(),
            page_label: format!("Page {page_number}"),
        },
        footer: FooterBand {
            columns: [
                lines([(company, ""), (settings.tagline.trim(), "")]),
                lines([
                    (settings.address.trim(), ""),
                    (settings.branches.trim(), "Branch Offices: "),
                ]),
                lines([
                    (settings.phone.trim(), "Contact: "),
                    (settings.whatsapp_number.trim(), "WhatsApp: "),
                ]),
            ],
            copyright: format!("© {company}. All rights reserved."),
        },
    }
}

/// Prefixed lines, skipping empty values.
fn lines<const N: usize>(fields: [(&str, &str); N]) -> Vec<String> {
    fields
        .into_iter()
        .filter(|(value, _)| !value.is_empty())
        .map(|(value, prefix)| format!("{prefix}{value}"))
        .collect()
}
