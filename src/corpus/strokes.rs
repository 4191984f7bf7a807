//! @ai:module:intent Stroke drawings and lazily parsed dataset samples
//! @ai:module:layer domain
//! @ai:module:public_api Point, Stroke, Strokes, StrokesPayload, PayloadFormat, Sample, BoundingBox
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// @ai:intent A single pen position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub time: f64,
}

pub type Stroke = Vec<Point>;

/// @ai:intent Ordered strokes of one drawing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Strokes(pub Vec<Stroke>);

impl Strokes {
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.0.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.points().next().is_none()
    }
}

/// @ai:intent Serialized layout of a strokes payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// `[[{"x":..,"y":..,"time":..}, ...], ...]`
    PointObjects,
    /// `[[[x, y, t], ...], ...]`
    PointTriples,
}

/// @ai:intent Strokes kept as text until a sample is actually benchmarked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokesPayload {
    pub format: PayloadFormat,
    pub raw: String,
}

impl StrokesPayload {
    pub fn new(format: PayloadFormat, raw: impl Into<String>) -> Self {
        Self {
            format,
            raw: raw.into(),
        }
    }

    /// @ai:intent Payload holding already parsed strokes
    /// @ai:effects pure
    pub fn from_strokes(strokes: &Strokes) -> Result<Self> {
        Ok(Self::new(PayloadFormat::PointObjects, serde_json::to_string(strokes)?))
    }

    /// @ai:intent Parse the payload into strokes
    /// @ai:pre raw matches the declared format
    /// @ai:effects pure
    pub fn parse(&self, symbol: &str) -> Result<Strokes> {
        let malformed = |e: serde_json::Error| Error::MalformedStrokes {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        };

        match self.format {
            PayloadFormat::PointObjects => serde_json::from_str(&self.raw).map_err(malformed),
            PayloadFormat::PointTriples => {
                let triples: Vec<Vec<[f64; 3]>> =
                    serde_json::from_str(&self.raw).map_err(malformed)?;
                Ok(Strokes(
                    triples
                        .into_iter()
                        .map(|stroke| {
                            stroke
                                .into_iter()
                                .map(|[x, y, time]| Point { x, y, time })
                                .collect()
                        })
                        .collect(),
                ))
            }
        }
    }
}

/// @ai:intent One dataset entry: the true symbol and its drawing
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub symbol: String,
    pub payload: StrokesPayload,
}

impl Sample {
    pub fn new(symbol: impl Into<String>, payload: StrokesPayload) -> Self {
        Self {
            symbol: symbol.into(),
            payload,
        }
    }

    pub fn strokes(&self) -> Result<Strokes> {
        self.payload.parse(&self.symbol)
    }
}

/// @ai:intent Running min/max of the coordinates seen so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: Option<f64>,
    pub min_y: Option<f64>,
    pub max_x: Option<f64>,
    pub max_y: Option<f64>,
}

impl BoundingBox {
    /// @ai:intent Grow the box so it contains every point of the drawing
    /// @ai:effects state:write
    pub fn include(&mut self, strokes: &Strokes) {
        for point in strokes.points() {
            self.min_x = Some(self.min_x.map_or(point.x, |v| v.min(point.x)));
            self.min_y = Some(self.min_y.map_or(point.y, |v| v.min(point.y)));
            self.max_x = Some(self.max_x.map_or(point.x, |v| v.max(point.x)));
            self.max_y = Some(self.max_y.map_or(point.y, |v| v.max(point.y)));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x.is_none()
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.min_x, self.min_y, self.max_x, self.max_y) {
            (Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => write!(
                f,
                "x: [{}, {}], y: [{}, {}]",
                min_x, max_x, min_y, max_y
            ),
            _ => write!(f, "empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point_objects() {
        let payload = StrokesPayload::new(
            PayloadFormat::PointObjects,
            r#"[[{"x":1,"y":2,"time":10},{"x":3,"y":4,"time":11}],[{"x":0,"y":5}]]"#,
        );
        let strokes = payload.parse("a").unwrap();
        assert_eq!(strokes.0.len(), 2);
        assert_eq!(strokes.0[0][1], Point { x: 3.0, y: 4.0, time: 11.0 });
        assert_eq!(strokes.0[1][0].time, 0.0);
    }

    #[test]
    fn test_parse_point_triples() {
        let payload = StrokesPayload::new(PayloadFormat::PointTriples, "[[[1,2,3],[4,5,6]]]");
        let strokes = payload.parse("b").unwrap();
        assert_eq!(strokes.0[0][1], Point { x: 4.0, y: 5.0, time: 6.0 });
    }

    #[test]
    fn test_parse_malformed_payload() {
        let payload = StrokesPayload::new(PayloadFormat::PointTriples, "[[1,2");
        let err = payload.parse("\\alpha").unwrap_err();
        assert!(matches!(err, Error::MalformedStrokes { ref symbol, .. } if symbol == "\\alpha"));
    }

    #[test]
    fn test_bounding_box_tracks_extremes() {
        let mut bbox = BoundingBox::default();
        assert!(bbox.is_empty());

        let payload = StrokesPayload::new(PayloadFormat::PointTriples, "[[[1,2,0],[-4,5,0]],[[3,-1,0]]]");
        bbox.include(&payload.parse("c").unwrap());

        assert_eq!(bbox.min_x, Some(-4.0));
        assert_eq!(bbox.max_x, Some(3.0));
        assert_eq!(bbox.min_y, Some(-1.0));
        assert_eq!(bbox.max_y, Some(5.0));
        assert_eq!(bbox.to_string(), "x: [-4, 3], y: [-1, 5]");
    }
}
