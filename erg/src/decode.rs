//! Column decoding: raw record bytes to typed value sequences
//!
//! Decoding dispatches once per column on the element kind and byte order,
//! then runs a tight loop that reinterprets each value's bytes. No widening,
//! unit conversion or NaN cleanup happens here.

use std::fmt;
use std::ops::Range;

use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian};
use serde::Serialize;

use crate::error::{ErgError, Result};
use crate::quantity::{ByteOrder, ElementKind};

/// Where the values of one column sit in a byte buffer
///
/// Value `i` starts at `base + i * step`. Row-major records use the record
/// size as step; a contiguous (column-major) run uses the element width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPlan {
    pub base: usize,
    pub step: usize,
}

impl ColumnPlan {
    pub const fn strided(base: usize, step: usize) -> Self {
        Self { base, step }
    }

    /// Values packed back to back starting at `base`
    ///
    /// Decoding one column of a transposed (column-major) buffer:
    ///
    /// ```
    /// use erg::{decode, ByteOrder, Column, ColumnPlan, ElementKind};
    ///
    /// // Two f32 columns of three values each, stored one after the other
    /// let bytes: Vec<u8> = [1.0f32, 2.0, 3.0, 10.0, 20.0, 30.0]
    ///     .iter()
    ///     .flat_map(|v| v.to_le_bytes())
    ///     .collect();
    ///
    /// let second = ColumnPlan::contiguous(3 * ElementKind::F32.width(), ElementKind::F32);
    /// let column = decode(ElementKind::F32, ByteOrder::LittleEndian, &bytes, second, 3)?;
    /// assert_eq!(column, Column::F32(vec![10.0, 20.0, 30.0]));
    /// # Ok::<(), erg::ErgError>(())
    /// ```
    pub const fn contiguous(base: usize, kind: ElementKind) -> Self {
        Self {
            base,
            step: kind.width(),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A primitive type a column can hold
pub trait Element: Copy + sealed::Sealed + 'static {
    const KIND: ElementKind;

    /// Reinterpret the first `KIND.width()` bytes of `buf`
    fn read<B: Endian>(buf: &[u8]) -> Self;

    /// Borrow a column's values if it holds this type
    fn view(column: &Column) -> Option<&[Self]>;
}

macro_rules! columns {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        /// Decoded values of one quantity, in the precision stored on disk
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum Column {
            $($variant(Vec<$ty>),)*
        }

        /// One decoded value
        #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum Scalar {
            $($variant($ty),)*
        }

        $(
            impl sealed::Sealed for $ty {}
        )*

        impl Column {
            /// An empty column able to hold `capacity` values without reallocating
            pub fn with_capacity(kind: ElementKind, capacity: usize) -> Self {
                match kind {
                    $(ElementKind::$variant => Self::$variant(Vec::with_capacity(capacity)),)*
                }
            }

            pub fn kind(&self) -> ElementKind {
                match self {
                    $(Self::$variant(_) => ElementKind::$variant,)*
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $(Self::$variant(values) => values.len(),)*
                }
            }

            pub fn get(&self, index: usize) -> Option<Scalar> {
                match self {
                    $(Self::$variant(values) => values.get(index).copied().map(Scalar::$variant),)*
                }
            }

            /// Copy of a sub-range, `None` if the range is out of bounds
            pub fn slice(&self, range: Range<usize>) -> Option<Self> {
                match self {
                    $(Self::$variant(values) => values.get(range).map(|s| Self::$variant(s.to_vec())),)*
                }
            }

            /// Every value widened to `f64`
            ///
            /// 64-bit integers above 2^53 lose precision.
            pub fn to_f64(&self) -> Vec<f64> {
                match self {
                    $(Self::$variant(values) => values.iter().map(|&v| v as f64).collect(),)*
                }
            }

            fn extend_from(
                &mut self,
                order: ByteOrder,
                bytes: &[u8],
                plan: ColumnPlan,
                count: usize,
            ) -> Result<()> {
                match self {
                    $(Self::$variant(values) => gather(values, order, bytes, plan, count),)*
                }
            }
        }

        impl fmt::Display for Scalar {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant(value) => write!(f, "{value}"),)*
                }
            }
        }

        impl Scalar {
            pub fn to_f64(self) -> f64 {
                match self {
                    $(Self::$variant(value) => value as f64,)*
                }
            }
        }
    };
}

columns! {
    I8 => i8,
    U8 => u8,
    I16 => i16,
    U16 => u16,
    I32 => i32,
    U32 => u32,
    I64 => i64,
    U64 => u64,
    F32 => f32,
    F64 => f64,
}

macro_rules! element {
    ($variant:ident => $ty:ty, |$buf:ident| $read:expr) => {
        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$variant;

            fn read<B: Endian>($buf: &[u8]) -> Self {
                $read
            }

            fn view(column: &Column) -> Option<&[Self]> {
                match column {
                    Column::$variant(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
    ($variant:ident => $ty:ty, $method:ident) => {
        element!($variant => $ty, |buf| B::$method(buf));
    };
}

element!(I8 => i8, |buf| buf[0] as i8);
element!(U8 => u8, |buf| buf[0]);
element!(I16 => i16, read_i16);
element!(U16 => u16, read_u16);
element!(I32 => i32, read_i32);
element!(U32 => u32, read_u32);
element!(I64 => i64, read_i64);
element!(U64 => u64, read_u64);
element!(F32 => f32, read_f32);
element!(F64 => f64, read_f64);

impl Column {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the values as `T`, `None` if the column holds another type
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::view(self)
    }
}

/// Decode `count` values of one column from `bytes`
pub fn decode(
    kind: ElementKind,
    order: ByteOrder,
    bytes: &[u8],
    plan: ColumnPlan,
    count: usize,
) -> Result<Column> {
    let mut column = Column::with_capacity(kind, count);
    column.extend_from(order, bytes, plan, count)?;
    Ok(column)
}

/// Append `count` decoded values to an existing column
pub(crate) fn decode_into(
    column: &mut Column,
    order: ByteOrder,
    bytes: &[u8],
    plan: ColumnPlan,
    count: usize,
) -> Result<()> {
    column.extend_from(order, bytes, plan, count)
}

fn gather<T: Element>(
    values: &mut Vec<T>,
    order: ByteOrder,
    bytes: &[u8],
    plan: ColumnPlan,
    count: usize,
) -> Result<()> {
    if count == 0 {
        return Ok(());
    }

    let width = T::KIND.width();
    if plan.step < width {
        return Err(ErgError::layout(format!(
            "Step of {} bytes is narrower than a {width}-byte {} value",
            plan.step,
            T::KIND
        )));
    }
    let end = (count - 1)
        .checked_mul(plan.step)
        .and_then(|span| span.checked_add(plan.base + width));
    if end.is_none_or(|end| end > bytes.len()) {
        return Err(ErgError::layout(format!(
            "{count} values of {} at {plan:?} exceed the {}-byte buffer",
            T::KIND,
            bytes.len()
        )));
    }

    values.reserve(count);
    match order {
        ByteOrder::LittleEndian => values.extend(
            bytes[plan.base..]
                .chunks(plan.step)
                .take(count)
                .map(|value| T::read::<LittleEndian>(&value[..width])),
        ),
        ByteOrder::BigEndian => values.extend(
            bytes[plan.base..]
                .chunks(plan.step)
                .take(count)
                .map(|value| T::read::<BigEndian>(&value[..width])),
        ),
    }
    Ok(())
}
