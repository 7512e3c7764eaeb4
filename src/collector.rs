use anyhow::Context;
use reqwest::{Client, Url};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://api.open-meteo.com/";

/// Thin client for the Open-Meteo current-weather endpoint (no API key
/// required).
pub struct OpenMeteoClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub windspeed: f64,
}

impl OpenMeteoClient {
    pub fn new(client: Client, base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).context("parse Open-Meteo base URL")?;
        Ok(OpenMeteoClient { client, base_url })
    }

    pub async fn current_weather(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> anyhow::Result<CurrentWeather> {
        let mut url = self.base_url.join("v1/forecast")?;
        url.query_pairs_mut()
            .append_pair("latitude", latitude)
            .append_pair("longitude", longitude)
            .append_pair("current_weather", "true");

        let res = self
            .client
            .get(url)
            .send()
            .await
            .context("request to Open-Meteo failed")?
            .error_for_status()
            .context("Open-Meteo returned an error status")?;

        let body: ForecastResponse = res.json().await.context("malformed Open-Meteo response")?;
        Ok(body.current_weather)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_weather_payload() {
        let payload = r#"{
            "latitude": -23.5,
            "longitude": -46.63,
            "current_weather": {
                "temperature": 24.3,
                "windspeed": 11.2,
                "winddirection": 152.0,
                "weathercode": 2,
                "time": "2024-06-01T12:00"
            }
        }"#;
        let parsed: ForecastResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.current_weather.temperature, 24.3);
        assert_eq!(parsed.current_weather.windspeed, 11.2);
    }

    #[test]
    fn forecast_url_includes_coordinates() {
        let client = OpenMeteoClient::new(Client::new(), DEFAULT_API_URL).unwrap();
        let mut url = client.base_url.join("v1/forecast").unwrap();
        url.query_pairs_mut()
            .append_pair("latitude", "-23.5505")
            .append_pair("longitude", "-46.6333")
            .append_pair("current_weather", "true");
        assert_eq!(
            url.as_str(),
            "https://api.open-meteo.com/v1/forecast?latitude=-23.5505&longitude=-46.6333&current_weather=true"
        );
    }
}
