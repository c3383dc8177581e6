//! Cell value trait for the three raster cell categories

use byteorder::ByteOrder;
use num_traits::NumCast;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Storage category of a raster, fixed for a whole computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    /// 32-bit signed integer cells
    Cell,
    /// 32-bit floating point cells
    FCell,
    /// 64-bit floating point cells
    DCell,
}

impl CellType {
    /// Size of one cell in bytes
    pub fn size_of(self) -> usize {
        match self {
            CellType::Cell | CellType::FCell => 4,
            CellType::DCell => 8,
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellType::Cell => "CELL",
            CellType::FCell => "FCELL",
            CellType::DCell => "DCELL",
        };
        f.write_str(name)
    }
}

/// Trait for types that can be stored in a raster cell.
///
/// Every category carries its own null marker. Patch membership compares
/// non-null values with [`CellValue::same_class`], which is exact: bit-for-bit
/// for floating point categories.
pub trait CellValue: Copy + Clone + Debug + PartialEq + NumCast + Send + Sync + 'static {
    /// Category tag for this type
    const CELL_TYPE: CellType;

    /// The null marker of this category
    fn null() -> Self;

    /// Check if this value is the null marker
    fn is_null(&self) -> bool;

    /// Overwrite this value with the null marker
    fn set_null(&mut self) {
        *self = Self::null();
    }

    /// Exact equality used for patch membership
    fn same_class(&self, other: &Self) -> bool;

    /// Decode a packed row of cells in byte order `B`
    fn decode_row<B: ByteOrder>(bytes: &[u8], out: &mut [Self]);

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

impl CellValue for i32 {
    const CELL_TYPE: CellType = CellType::Cell;

    fn null() -> Self {
        i32::MIN
    }

    fn is_null(&self) -> bool {
        *self == i32::MIN
    }

    fn same_class(&self, other: &Self) -> bool {
        self == other
    }

    fn decode_row<B: ByteOrder>(bytes: &[u8], out: &mut [Self]) {
        B::read_i32_into(bytes, out);
    }
}

macro_rules! impl_cell_value_float {
    ($t:ty, $cell_type:expr, $read:ident) => {
        impl CellValue for $t {
            const CELL_TYPE: CellType = $cell_type;

            fn null() -> Self {
                <$t>::NAN
            }

            fn is_null(&self) -> bool {
                self.is_nan()
            }

            fn same_class(&self, other: &Self) -> bool {
                self.to_bits() == other.to_bits()
            }

            fn decode_row<B: ByteOrder>(bytes: &[u8], out: &mut [Self]) {
                B::$read(bytes, out);
            }
        }
    };
}

impl_cell_value_float!(f32, CellType::FCell, read_f32_into);
impl_cell_value_float!(f64, CellType::DCell, read_f64_into);
