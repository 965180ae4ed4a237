// src/services/document_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, PeriodRepository, RetentionRepository, SettingsRepository},
    domain::valuation::find_retention_item,
    models::{
        inventory::InventoryRecord,
        periods::OrganizationalUnit,
        retention::RetentionScheduleItem,
        settings::OrganizationSettings,
    },
};

// ---
// Conteúdo do rótulo (independente do PDF)
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxLabel {
    pub fund: String,
    pub document_number: Option<String>,
    pub section: String,
    pub series: String,
    pub subseries: String,
    pub content: String,
    pub dates: String,
    pub box_number: String,
    pub folder_number: String,
    pub folio_count: i32,
    pub qr_payload: String,
}

impl BoxLabel {
    pub fn compose(
        record: &InventoryRecord,
        settings: &OrganizationSettings,
        unit: Option<&OrganizationalUnit>,
        item: Option<&RetentionScheduleItem>,
    ) -> Self {
        let fund = settings
            .fund_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "FONDO SIN NOMBRE".to_string());

        let section = unit
            .map(|u| format!("{} - {}", u.code, u.name))
            .unwrap_or_default();

        // Sem item da TRD, o código do inventário é a única referência da série
        let (series, subseries) = match item {
            Some(item) => (
                format!("{} - {}", item.series_code, item.series_name),
                match (&item.subseries_code, &item.subseries_name) {
                    (Some(code), Some(name)) => format!("{code} - {name}"),
                    (Some(code), None) => code.clone(),
                    (None, Some(name)) => name.clone(),
                    (None, None) => String::new(),
                },
            ),
            None => (record.code.clone(), String::new()),
        };

        let dates = format!(
            "{} - {}",
            record.start_date.format("%d/%m/%Y"),
            record.end_date.format("%d/%m/%Y")
        );
        let box_number = record.box_number.clone().unwrap_or_default();
        let folder_number = record.folder_number.clone().unwrap_or_default();

        let qr_payload = [
            fund.as_str(),
            section.as_str(),
            series.as_str(),
            box_number.as_str(),
            folder_number.as_str(),
            &record.folio_count.to_string(),
            dates.as_str(),
            &record.id.to_string(),
        ]
        .join("|");

        Self {
            fund,
            document_number: settings.document_number.clone(),
            section,
            series,
            subseries,
            content: record.subject.clone(),
            dates,
            box_number,
            folder_number,
            folio_count: record.folio_count,
            qr_payload,
        }
    }
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Falha ao gerar o PDF: {e}"))
}

#[derive(Clone)]
pub struct DocumentService {
    inventory_repo: InventoryRepository,
    period_repo: PeriodRepository,
    retention_repo: RetentionRepository,
    settings_repo: SettingsRepository,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(
        inventory_repo: InventoryRepository,
        period_repo: PeriodRepository,
        retention_repo: RetentionRepository,
        settings_repo: SettingsRepository,
        fonts_dir: PathBuf,
    ) -> Self {
        Self { inventory_repo, period_repo, retention_repo, settings_repo, fonts_dir }
    }

    pub async fn box_label<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        record_id: Uuid,
    ) -> Result<BoxLabel, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Busca os dados
        let record = self
            .inventory_repo
            .find_record(&mut *tx, organization_id, record_id)
            .await?
            .ok_or(AppError::ResourceNotFound("inventory_record"))?;

        let settings = self.settings_repo.get_settings(&mut *tx, organization_id).await?;

        let unit = match record.organizational_unit_id {
            Some(unit_id) => self.period_repo.find_unit(&mut *tx, organization_id, unit_id).await?,
            None => None,
        };

        let items = self.retention_repo.list_active_items(&mut *tx, organization_id).await?;
        let item = find_retention_item(&record.code, &items);

        Ok(BoxLabel::compose(&record, &settings, unit.as_ref(), item))
    }

    pub async fn generate_box_label_pdf<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        record_id: Uuid,
    ) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let label = self.box_label(executor, organization_id, record_id).await?;
        self.render(&label)
    }

    fn render(&self, label: &BoxLabel) -> Result<Vec<u8>, AppError> {
        // 2. Configura o PDF
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None).map_err(|_| {
            AppError::FontNotFound(format!("Roboto em {}", self.fonts_dir.display()))
        })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Rótulo caja {}", label.box_number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(label.fund.to_uppercase())
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        if let Some(number) = &label.document_number {
            doc.push(
                elements::Paragraph::new(format!("NIT: {number}"))
                    .styled(style::Style::new().with_font_size(9)),
            );
        }
        doc.push(
            elements::Paragraph::new("TABLA DE RETENCIÓN DOCUMENTAL")
                .styled(style::Style::new().italic().with_font_size(9)),
        );
        doc.push(elements::Break::new(1.5));

        // --- IDENTIFICAÇÃO ---
        let mut table = elements::TableLayout::new(vec![1, 3]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        let rows = [
            ("FONDO:", label.fund.as_str()),
            ("SECCIÓN:", label.section.as_str()),
            ("SERIE:", label.series.as_str()),
            ("SUBSERIE:", label.subseries.as_str()),
            ("CONTENIDO:", label.content.as_str()),
            ("FECHAS:", label.dates.as_str()),
        ];
        for (name, value) in rows {
            table
                .row()
                .element(elements::Paragraph::new(name).styled(style_bold))
                .element(elements::Paragraph::new(value))
                .push()
                .map_err(pdf_error)?;
        }
        doc.push(table);
        doc.push(elements::Break::new(1));

        // --- CAIXA / CARPETA / FOLIOS ---
        let mut numbers = elements::TableLayout::new(vec![1, 1, 1]);
        numbers.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        numbers
            .row()
            .element(elements::Paragraph::new("No. CAJA").styled(style_bold))
            .element(elements::Paragraph::new("No. CARPETA").styled(style_bold))
            .element(elements::Paragraph::new("FOLIOS").styled(style_bold))
            .push()
            .map_err(pdf_error)?;
        numbers
            .row()
            .element(
                elements::Paragraph::new(label.box_number.as_str())
                    .styled(style::Style::new().bold().with_font_size(18)),
            )
            .element(elements::Paragraph::new(label.folder_number.as_str()))
            .element(elements::Paragraph::new(label.folio_count.to_string()))
            .push()
            .map_err(pdf_error)?;
        doc.push(numbers);
        doc.push(elements::Break::new(1.5));

        // --- QR CODE ---
        let code = QrCode::new(label.qr_payload.as_bytes()).map_err(pdf_error)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(pdf_error)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(pdf_image);

        // 3. Renderiza para buffer (memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::ConservationUnit;
    use crate::models::retention::FinalDisposition;
    use chrono::{NaiveDate, Utc};

    fn record() -> InventoryRecord {
        InventoryRecord {
            id: Uuid::nil(),
            organization_id: Uuid::nil(),
            order_number: 3,
            code: "100.2".into(),
            subject: "Contratos de arrendamiento".into(),
            start_date: NaiveDate::from_ymd_opt(1985, 2, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(1987, 11, 30).unwrap(),
            conservation_unit: ConservationUnit::Box,
            box_number: Some("12".into()),
            folder_number: Some("3".into()),
            folio_count: 187,
            organizational_unit_id: None,
            historical_period_id: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn label_uses_schedule_item_and_unit() {
        let settings = OrganizationSettings {
            fund_name: Some("Empresa S.A.S.".into()),
            document_number: Some("900.123.456-7".into()),
            ..OrganizationSettings::empty(Uuid::nil())
        };
        let unit = OrganizationalUnit {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            period_id: Uuid::new_v4(),
            code: "100".into(),
            name: "Gerencia".into(),
            hierarchy_level: None,
            parent_id: None,
            active: true,
            created_at: Utc::now(),
        };
        let item = RetentionScheduleItem {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            position: 0,
            series_code: "100".into(),
            series_name: "Contratos".into(),
            subseries_code: Some("100.2".into()),
            subseries_name: Some("Arrendamiento".into()),
            office_retention_years: 2,
            central_retention_years: 8,
            final_disposition: FinalDisposition::Selection,
            procedure: None,
            observations: None,
        };

        let label = BoxLabel::compose(&record(), &settings, Some(&unit), Some(&item));

        assert_eq!(label.fund, "Empresa S.A.S.");
        assert_eq!(label.section, "100 - Gerencia");
        assert_eq!(label.series, "100 - Contratos");
        assert_eq!(label.subseries, "100.2 - Arrendamiento");
        assert_eq!(label.dates, "01/02/1985 - 30/11/1987");
        assert_eq!(
            label.qr_payload,
            format!("Empresa S.A.S.|100 - Gerencia|100 - Contratos|12|3|187|01/02/1985 - 30/11/1987|{}", Uuid::nil())
        );
    }

    #[test]
    fn label_without_settings_or_schedule_falls_back() {
        let label = BoxLabel::compose(&record(), &OrganizationSettings::empty(Uuid::nil()), None, None);

        assert_eq!(label.fund, "FONDO SIN NOMBRE");
        assert_eq!(label.section, "");
        assert_eq!(label.series, "100.2");
        assert_eq!(label.subseries, "");
        assert_eq!(label.folio_count, 187);
    }
}
