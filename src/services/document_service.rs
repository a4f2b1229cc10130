// src/services/document_service.rs

use std::path::{Path, PathBuf};

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{ChecklistRepository, InspectionRepository},
    models::inspection::{InspectionReport, InspectionReportItem, ReportStatus},
};

const FONT_FAMILY: &str = "Roboto";

fn qr_image(data: &str) -> Result<image::DynamicImage, AppError> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| AppError::DocumentError(e.to_string()))?;
    let buffer = code.render::<Luma<u8>>().build();
    Ok(image::DynamicImage::ImageLuma8(buffer))
}

/// QR code em PNG para o texto informado.
pub fn qr_png(data: &str) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    qr_image(data)?
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .map_err(|e| AppError::DocumentError(e.to_string()))?;
    Ok(bytes)
}

/// Conteúdo do QR de um item do checklist.
pub fn checklist_qr_payload(id: i64, qr_payload: Option<&str>) -> String {
    qr_payload
        .map(str::to_owned)
        .unwrap_or_else(|| format!("checklist-item:{id}"))
}

#[derive(Clone)]
pub struct DocumentService {
    pool: SqlitePool,
    inspection_repo: InspectionRepository,
    checklist_repo: ChecklistRepository,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(
        pool: SqlitePool,
        inspection_repo: InspectionRepository,
        checklist_repo: ChecklistRepository,
        fonts_dir: PathBuf,
    ) -> Self {
        Self {
            pool,
            inspection_repo,
            checklist_repo,
            fonts_dir,
        }
    }

    pub async fn checklist_item_qr(&self, id: i64) -> Result<Vec<u8>, AppError> {
        let item = self
            .checklist_repo
            .find_item(id)
            .await?
            .ok_or_else(|| AppError::not_found("Checklist item", id))?;
        qr_png(&checklist_qr_payload(item.id, item.qr_payload.as_deref()))
    }

    pub async fn generate_report_pdf(&self, report_id: i64) -> Result<Vec<u8>, AppError> {
        let report = self
            .inspection_repo
            .find_report(&self.pool, report_id)
            .await?
            .ok_or_else(|| AppError::not_found("Inspection report", report_id))?;
        let items = self.inspection_repo.list_items(&self.pool, report_id).await?;

        // Fontes + layout + render são síncronos: fora do executor
        let fonts_dir = self.fonts_dir.clone();
        tokio::task::spawn_blocking(move || render_report_pdf(&fonts_dir, &report, &items))
            .await
            .map_err(|e| anyhow::anyhow!("PDF rendering task failed: {}", e))?
    }
}

/// Monta e renderiza o PDF de um relatório (fontes em `fonts_dir`).
pub fn render_report_pdf(
    fonts_dir: &Path,
    report: &InspectionReport,
    items: &[InspectionReportItem],
) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None).map_err(|e| {
        AppError::DocumentError(format!(
            "font '{}' not found in {}: {}",
            FONT_FAMILY,
            fonts_dir.display(),
            e
        ))
    })?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Inspection report #{}", report.id));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    // --- CABEÇALHO ---
    doc.push(
        elements::Paragraph::new("MHE PRE-USE INSPECTION")
            .styled(style::Style::new().bold().with_font_size(18)),
    );
    doc.push(elements::Break::new(1));
    doc.push(elements::Paragraph::new(format!("Unit: {}", report.unit_code)));
    doc.push(elements::Paragraph::new(format!(
        "Date: {}",
        report.inspection_date.format("%Y-%m-%d")
    )));
    doc.push(elements::Paragraph::new(format!("Operator: {}", report.operator_username)));

    let (status_text, status_style) = match report.status {
        ReportStatus::Safe => ("SAFE TO OPERATE", style::Style::new().bold()),
        ReportStatus::Unsafe => (
            "UNSAFE - DO NOT OPERATE",
            style::Style::new().bold().with_color(style::Color::Rgb(200, 0, 0)),
        ),
    };
    doc.push(elements::Paragraph::new(status_text).styled(status_style.with_font_size(14)));

    if let Some(reason) = &report.analysis_reason {
        doc.push(elements::Paragraph::new(reason.as_str()).styled(style::Style::new().italic()));
    }

    doc.push(elements::Break::new(1.5));

    // --- TABELA DE ITENS ---
    // Pesos: Peça (3), Pergunta (5), Resultado (2), Observações (4)
    let mut table = elements::TableLayout::new(vec![3, 5, 2, 4]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Part").styled(style_bold))
        .element(elements::Paragraph::new("Question").styled(style_bold))
        .element(elements::Paragraph::new("Result").styled(style_bold))
        .element(elements::Paragraph::new("Remarks").styled(style_bold))
        .push()
        .map_err(|e| AppError::DocumentError(e.to_string()))?;

    for item in items {
        table
            .row()
            .element(elements::Paragraph::new(item.part_name.as_str()))
            .element(elements::Paragraph::new(item.question.as_str()))
            .element(elements::Paragraph::new(if item.is_safe { "Safe" } else { "Unsafe" }))
            .element(elements::Paragraph::new(item.remarks.clone().unwrap_or_default()))
            .push()
            .map_err(|e| AppError::DocumentError(e.to_string()))?;
    }

    doc.push(table);
    doc.push(elements::Break::new(2));

    // --- QR DA UNIDADE ---
    let unit_qr = elements::Image::from_dynamic_image(qr_image(&report.unit_code)?)
        .map_err(|e| AppError::DocumentError(e.to_string()))?
        .with_scale(genpdf::Scale::new(0.5, 0.5));
    doc.push(unit_qr);

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::DocumentError(e.to_string()))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_png_has_png_signature() {
        let png = qr_png("FL-001").unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn missing_fonts_are_a_document_error() {
        let dir = tempfile::tempdir().unwrap();
        let report = InspectionReport {
            id: 1,
            unit_id: 1,
            unit_code: "FL-001".into(),
            inspection_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            operator_username: "op".into(),
            status: ReportStatus::Safe,
            user_id: 1,
            analysis_reason: None,
            created_at: chrono::Utc::now(),
        };
        let err = render_report_pdf(dir.path(), &report, &[]).unwrap_err();
        assert!(matches!(err, AppError::DocumentError(_)));
    }

    #[test]
    fn checklist_qr_falls_back_to_item_id() {
        assert_eq!(checklist_qr_payload(7, Some("FORK-01")), "FORK-01");
        assert_eq!(checklist_qr_payload(7, None), "checklist-item:7");
    }
}
