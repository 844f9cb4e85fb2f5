// src/views/vehicle_models.rs
use std::collections::BTreeSet;

use crate::error::{DashboardError, Result};
use crate::formatters::{format_count, format_currency, format_percent, or_na};
use crate::models::VehicleDataResponse;
use crate::services::api_client::ApiClient;
use crate::views::{error_banner, slot_status, FetchSlot, TextTable};

pub struct VehicleModelsView {
    data: FetchSlot<VehicleDataResponse>,
}

impl Default for VehicleModelsView {
    fn default() -> Self {
        VehicleModelsView {
            data: FetchSlot::new("vehicle-models"),
        }
    }
}

impl VehicleModelsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &FetchSlot<VehicleDataResponse> {
        &self.data
    }

    pub async fn load(&self, client: &ApiClient) -> bool {
        self.data.load(fetch_vehicle_data(client)).await
    }

    pub fn teardown(&self) {
        self.data.teardown();
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Vehicle Models\n");
        let state = self.data.state();
        let Some(data) = self.data.latest() else {
            out.push_str(&slot_status(&state, "Vehicle data").unwrap_or_default());
            return out;
        };
        if let Some(error) = state.error() {
            out.push_str(&error_banner(error));
        }

        let mut lineup = TextTable::new(["Model", "Segment", "Base ASP", "Margin Premium", "Capacity", "Trajectory"]);
        for (code, model) in &data.vehicle_models {
            lineup.row([
                model.name.clone().unwrap_or_else(|| code.clone()),
                or_na(model.segment.clone()),
                format_currency(model.base_asp),
                format_percent(model.margin_premium),
                format_count(model.max_capacity),
                or_na(model.growth_trajectory.clone()),
            ]);
        }
        if !lineup.is_empty() {
            out.push_str(&lineup.render());
        }

        // Columns follow model codes seen in any year.
        let codes: BTreeSet<&String> = data
            .historical_deliveries
            .values()
            .flat_map(|by_model| by_model.keys())
            .collect();
        if !codes.is_empty() {
            let mut headers = vec!["Year".to_string()];
            headers.extend(codes.iter().map(|code| display_name(&data, code)));
            headers.push("Total".to_string());
            let mut deliveries = TextTable::new(headers);
            for (year, by_model) in &data.historical_deliveries {
                let mut row = vec![year.clone()];
                row.extend(codes.iter().map(|code| format_count(by_model.get(*code).copied())));
                row.push(format_count(by_model.values().sum::<f64>()));
                deliveries.row(row);
            }
            out.push('\n');
            out.push_str(&deliveries.render());
        }

        if data.vehicle_models.is_empty() && data.historical_deliveries.is_empty() {
            out.push_str("No vehicle data returned.\n");
        }
        out
    }
}

fn display_name(data: &VehicleDataResponse, code: &str) -> String {
    data.vehicle_models
        .get(code)
        .and_then(|m| m.name.clone())
        .unwrap_or_else(|| code.to_string())
}

async fn fetch_vehicle_data(client: &ApiClient) -> Result<VehicleDataResponse> {
    let response = client.vehicle_data().await?;
    if !response.success && response.vehicle_models.is_empty() && response.historical_deliveries.is_empty() {
        return Err(DashboardError::Rejected(
            response
                .message
                .unwrap_or_else(|| "vehicle data request reported failure".to_string()),
        ));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleModel;
    use std::collections::BTreeMap;

    #[test]
    fn renders_models_and_deliveries() {
        let view = VehicleModelsView::new();
        let mut data = VehicleDataResponse {
            success: true,
            ..Default::default()
        };
        data.vehicle_models.insert(
            "model_y".into(),
            VehicleModel {
                name: Some("Model Y".into()),
                segment: Some("mass_market_suv".into()),
                base_asp: Some(52_000.0),
                margin_premium: Some(0.2),
                max_capacity: Some(1_500_000.0),
                growth_trajectory: Some("high_growth".into()),
            },
        );
        data.historical_deliveries.insert(
            "2023".into(),
            BTreeMap::from([("model_y".to_string(), 1_112_769.0), ("cybertruck".to_string(), 1_163.0)]),
        );
        let ticket = view.data.begin().unwrap();
        view.data.finish(ticket, Ok(data));

        let text = view.render();
        assert!(text.contains("Model Y"));
        assert!(text.contains("$52,000.00"));
        assert!(text.contains("20.0%"));
        assert!(text.contains("1,112,769"));
        assert!(text.contains("1,113,932"));
        assert!(text.contains("cybertruck"));
    }

    #[test]
    fn error_is_shown_inline() {
        let view = VehicleModelsView::new();
        let ticket = view.data.begin().unwrap();
        view.data.finish(ticket, Err(DashboardError::Rejected("offline".into())));
        assert!(view.render().contains("! Error: backend rejected the request: offline"));
    }
}
