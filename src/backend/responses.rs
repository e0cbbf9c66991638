use serde::Deserialize;

#[derive(Deserialize, Debug, PartialEq)]
pub struct PredictResponse {
    pub predicted_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ok() -> crate::Result {
        let response: PredictResponse = serde_json::from_str(
            // language=JSON
            r#"{"predicted_price": 1234567.891}"#,
        )?;
        assert_eq!(response.predicted_price, 1234567.891);
        Ok(())
    }

    #[test]
    fn parse_missing_price_fails() {
        assert!(serde_json::from_str::<PredictResponse>(r#"{"price": 1}"#).is_err());
    }
}
