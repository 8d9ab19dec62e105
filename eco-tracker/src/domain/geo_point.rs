// src/domain/geo_point.rs

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// 地球の平均半径（km）
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// GeoJSON Point 形式の位置情報（経度, 緯度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

/// 位置情報の検証エラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoPointError {
    #[error("Coordinates must be finite numbers")]
    NotFinite,
    #[error("Longitude must be between -180 and 180")]
    LongitudeOutOfRange,
    #[error("Latitude must be between -90 and 90")]
    LatitudeOutOfRange,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoPointError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(GeoPointError::NotFinite);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoPointError::LongitudeOutOfRange);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoPointError::LatitudeOutOfRange);
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// 2点間の大円距離（km）
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        Haversine.distance(Point::from(*self), Point::from(*other)) / 1000.0
    }

    /// 半径 radius_km の円を内包する緯度経度の矩形
    pub fn bounding_box(&self, radius_km: f64) -> BoundingBox {
        let lat_delta = (radius_km / EARTH_RADIUS_KM).to_degrees();
        let min_lat = (self.latitude - lat_delta).max(-90.0);
        let max_lat = (self.latitude + lat_delta).min(90.0);

        // 極付近や日付変更線をまたぐ場合は経度方向を全域とする
        let cos_lat = self.latitude.to_radians().cos();
        let lng_delta = if cos_lat <= f64::EPSILON {
            180.0
        } else {
            (radius_km / (EARTH_RADIUS_KM * cos_lat)).to_degrees()
        };
        let (min_lng, max_lng) = if max_lat >= 90.0
            || min_lat <= -90.0
            || self.longitude - lng_delta < -180.0
            || self.longitude + lng_delta > 180.0
        {
            (-180.0, 180.0)
        } else {
            (self.longitude - lng_delta, self.longitude + lng_delta)
        };

        BoundingBox {
            min_lng,
            max_lng,
            min_lat,
            max_lat,
        }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Point::new(point.longitude, point.latitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

/// GeoJSON の Point 表現
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl From<GeoPoint> for GeoJsonPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [point.longitude, point.latitude],
        }
    }
}
