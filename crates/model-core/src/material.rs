//! Materials, colors and texture maps.

use nalgebra::Vector2;

use crate::geometry::{is_equal, is_zero};

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Converts a color to a lowercase `rrggbb` hex string.
pub fn color_to_hex_string(color: &Color) -> String {
    format!("{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Parses an `rrggbb` hex string. Returns `None` for malformed input.
pub fn hex_string_to_color(hex: &str) -> Option<Color> {
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::new(r, g, b))
}

/// Converts an sRGB color component (0..1) to linear.
pub fn srgb_to_linear(component: f64) -> f64 {
    if component < 0.04045 {
        component * 0.0773993808
    } else {
        (component * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// Converts a linear color component (0..1) to sRGB.
pub fn linear_to_srgb(component: f64) -> f64 {
    if component < 0.0031308 {
        component * 12.92
    } else {
        1.055 * component.powf(0.41666) - 0.055
    }
}

/// A texture reference with an optional UV transformation.
#[derive(Debug, Clone)]
pub struct TextureMap {
    pub name: String,
    pub buffer: Option<Vec<u8>>,
    pub offset: Vector2<f64>,
    pub scale: Vector2<f64>,
    /// Rotation in radians.
    pub rotation: f64,
}

impl TextureMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffer: None,
            offset: Vector2::new(0.0, 0.0),
            scale: Vector2::new(1.0, 1.0),
            rotation: 0.0,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.buffer.is_some()
    }

    pub fn has_transformation(&self) -> bool {
        !is_zero(self.offset.x)
            || !is_zero(self.offset.y)
            || !is_equal(self.scale.x, 1.0)
            || !is_equal(self.scale.y, 1.0)
            || !is_zero(self.rotation)
    }
}

/// Shading model discriminant, without the per-model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingModel {
    Phong,
    Physical,
}

/// Shading-model specific material parameters.
#[derive(Debug, Clone)]
pub enum MaterialKind {
    Phong {
        ambient: Color,
        specular: Color,
        emissive: Color,
        /// 0.0 .. 1.0
        shininess: f64,
    },
    Physical {
        /// 0.0 .. 1.0
        metalness: f64,
        /// 0.0 .. 1.0
        roughness: f64,
    },
}

/// A surface material, Phong or Physical.
#[derive(Debug, Clone)]
pub struct Material {
    pub kind: MaterialKind,
    pub name: String,
    pub color: Color,
    /// 0.0 .. 1.0
    pub opacity: f64,
    /// 0.0 .. 1.0
    pub alpha_test: f64,
    pub transparent: bool,

    pub diffuse_map: Option<TextureMap>,
    pub specular_map: Option<TextureMap>,
    pub bump_map: Option<TextureMap>,
    pub normal_map: Option<TextureMap>,
    pub emissive_map: Option<TextureMap>,
    pub metalness_map: Option<TextureMap>,

    /// Set on materials synthesized by the finalization pipeline rather
    /// than supplied by source data.
    pub is_default: bool,
}

impl Material {
    pub fn phong() -> Self {
        Self::with_kind(MaterialKind::Phong {
            ambient: Color::BLACK,
            specular: Color::BLACK,
            emissive: Color::BLACK,
            shininess: 0.0,
        })
    }

    pub fn physical() -> Self {
        Self::with_kind(MaterialKind::Physical {
            metalness: 0.0,
            roughness: 1.0,
        })
    }

    pub fn with_kind(kind: MaterialKind) -> Self {
        Self {
            kind,
            name: String::new(),
            color: Color::BLACK,
            opacity: 1.0,
            alpha_test: 0.0,
            transparent: false,
            diffuse_map: None,
            specular_map: None,
            bump_map: None,
            normal_map: None,
            emissive_map: None,
            metalness_map: None,
            is_default: false,
        }
    }

    pub fn is_phong(&self) -> bool {
        self.shading_model() == ShadingModel::Phong
    }

    pub fn is_physical(&self) -> bool {
        self.shading_model() == ShadingModel::Physical
    }

    pub fn shading_model(&self) -> ShadingModel {
        match self.kind {
            MaterialKind::Phong { .. } => ShadingModel::Phong,
            MaterialKind::Physical { .. } => ShadingModel::Physical,
        }
    }

    /// Visits every texture map the material carries.
    pub fn enumerate_texture_maps(&self, mut enumerator: impl FnMut(&TextureMap)) {
        for map in [
            &self.diffuse_map,
            &self.specular_map,
            &self.bump_map,
            &self.normal_map,
            &self.emissive_map,
            &self.metalness_map,
        ]
        .into_iter()
        .flatten()
        {
            enumerator(map);
        }
    }
}
