//! SAF-T export: a read-only report generator over [`FiscalDocument`] rows.
//!
//! Deliberately not a schema-validated exporter — no XSD, no per-locale
//! master-data sections, no inventory/general-ledger blocks. It is the one
//! thing a fiscal authority actually asks the POS for: every invoice/receipt/
//! credit-note issued at a site in a date range, in document-number order,
//! wrapped in a minimal `AuditFile` envelope.

use std::fmt::Write as _;
use std::sync::Arc;

use shared::error::AppError;

use crate::audit::{AuditAction, AuditService};
use crate::db::models::{FiscalDocument, FiscalDocumentType};
use crate::db::repository::FiscalDocumentRepository;

#[derive(Clone)]
pub struct SaftReportService {
    documents: FiscalDocumentRepository,
    audit: Arc<AuditService>,
}

impl SaftReportService {
    pub fn new(documents: FiscalDocumentRepository, audit: Arc<AuditService>) -> Arc<Self> {
        Arc::new(Self { documents, audit })
    }

    /// Renders the simplified AuditFile XML for every document issued at
    /// `site` within `[from, to]` and records a
    /// [`AuditAction::SaftExportGenerated`] entry — an export is itself a
    /// fiscally relevant action, auditable like any other.
    pub async fn export(
        &self,
        tenant: &str,
        site: &str,
        from: i64,
        to: i64,
        operator_id: Option<String>,
    ) -> Result<String, AppError> {
        let documents = self.documents.find_in_range(tenant, site, from, to).await?;
        let xml = render_audit_file(tenant, site, from, to, &documents);

        self.audit
            .log(
                tenant,
                AuditAction::SaftExportGenerated,
                "saft_export",
                site,
                operator_id,
                None,
                serde_json::json!({
                    "site": site,
                    "from": from,
                    "to": to,
                    "document_count": documents.len(),
                }),
            )
            .await;

        Ok(xml)
    }
}

fn render_audit_file(tenant: &str, site: &str, from: i64, to: i64, documents: &[FiscalDocument]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(out, r#"<AuditFile>"#);
    let _ = writeln!(out, "  <Header>");
    let _ = writeln!(out, "    <TenantID>{}</TenantID>", escape(tenant));
    let _ = writeln!(out, "    <SiteID>{}</SiteID>", escape(site));
    let _ = writeln!(out, "    <StartDate>{from}</StartDate>");
    let _ = writeln!(out, "    <EndDate>{to}</EndDate>");
    let _ = writeln!(out, "  </Header>");
    let _ = writeln!(out, "  <SourceDocuments>");
    for doc in documents {
        let _ = writeln!(out, "    <Document>");
        let _ = writeln!(out, "      <DocumentType>{}</DocumentType>", document_type_code(doc.document_type));
        let _ = writeln!(out, "      <DocumentNumber>{}</DocumentNumber>", doc.document_number);
        let _ = writeln!(out, "      <OrderID>{}</OrderID>", escape(&doc.order_id));
        if let Some(tax_id) = &doc.customer_tax_id {
            let _ = writeln!(out, "      <CustomerTaxID>{}</CustomerTaxID>", escape(tax_id));
        }
        let _ = writeln!(out, "      <GrossTotal>{}</GrossTotal>", doc.total_amount.as_decimal());
        let _ = writeln!(out, "      <Voided>{}</Voided>", doc.voided);
        let _ = writeln!(out, "      <IssueDate>{}</IssueDate>", doc.issued_at);
        let _ = writeln!(out, "    </Document>");
    }
    let _ = writeln!(out, "  </SourceDocuments>");
    let _ = writeln!(out, "</AuditFile>");
    out
}

fn document_type_code(document_type: FiscalDocumentType) -> &'static str {
    match document_type {
        FiscalDocumentType::Receipt => "FR",
        FiscalDocumentType::Invoice => "FT",
        FiscalDocumentType::CreditNote => "NC",
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
