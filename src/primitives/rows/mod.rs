#![forbid(unsafe_code)]

//! Row-of-pages slot storage.
//!
//! Slots live in fixed-width rows. A dense index `n` maps to row
//! `n >> row_shift` and offset `n & (row_width - 1)`. Rows are allocated at
//! full width and never reallocated; only the table of rows grows (by
//! doubling), so a slot never moves once written.

use std::mem;
use std::ops::{Index, IndexMut};

use tracing::{debug, warn};

use crate::types::{RbError, Result};

/// Page size the default row width is derived from.
pub const DEFAULT_PAGE_BYTES: usize = 4096;

/// Initial capacity of the row table.
pub const DEFAULT_INITIAL_ROWS: usize = 16;

/// Largest accepted `row_shift`.
pub const MAX_ROW_SHIFT: u32 = 20;

const DEFAULT_ROW_SHIFT: u32 = (DEFAULT_PAGE_BYTES / mem::size_of::<usize>()).trailing_zeros();

/// Sizing knobs for [`RowStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowOptions {
    /// log2 of the number of slots per row.
    pub row_shift: u32,
    /// Row-table capacity reserved up front.
    pub initial_rows: usize,
    /// Upper bound on allocated rows. Growth past it fails with
    /// [`RbError::OutOfMemory`].
    pub max_rows: Option<usize>,
}

impl Default for RowOptions {
    fn default() -> Self {
        Self {
            row_shift: DEFAULT_ROW_SHIFT,
            initial_rows: DEFAULT_INITIAL_ROWS,
            max_rows: None,
        }
    }
}

impl RowOptions {
    /// Derives the row width from a virtual-memory page size: one row holds
    /// as many pointer-sized slots as fit in one page.
    pub fn for_page_size(page_bytes: usize) -> Result<Self> {
        let slots = page_bytes / mem::size_of::<usize>();
        if slots < 2 || !slots.is_power_of_two() {
            return Err(RbError::InvalidOptions(
                "page size must be a power of two holding at least two pointers",
            ));
        }
        let opts = Self {
            row_shift: slots.trailing_zeros(),
            ..Self::default()
        };
        opts.validate()?;
        Ok(opts)
    }

    /// Number of slots per row.
    #[inline]
    pub fn row_width(&self) -> usize {
        1usize << self.row_shift
    }

    /// Checks that every knob is in range.
    pub fn validate(&self) -> Result<()> {
        if self.row_shift == 0 || self.row_shift > MAX_ROW_SHIFT {
            return Err(RbError::InvalidOptions("row_shift must be within 1..=20"));
        }
        if self.initial_rows == 0 {
            return Err(RbError::InvalidOptions("initial_rows must be at least 1"));
        }
        if self.max_rows == Some(0) {
            return Err(RbError::InvalidOptions("max_rows must be at least 1"));
        }
        Ok(())
    }
}

/// Snapshot of a store's row layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageShape {
    /// Allocated rows.
    pub rows: usize,
    /// Slots per row.
    pub row_width: usize,
    /// Row-table capacity.
    pub row_table_capacity: usize,
    /// Allocated slots across all rows.
    pub capacity: usize,
    /// Occupied slots.
    pub occupied: usize,
}

/// Paged slot storage addressed by dense `u32` indices.
pub struct RowStore<T> {
    rows: Vec<Vec<T>>,
    table_capacity: usize,
    shift: u32,
    mask: usize,
    max_rows: Option<usize>,
    next: usize,
}

impl<T> RowStore<T> {
    /// Creates an empty store with the row table reserved but no rows.
    pub fn new(opts: &RowOptions) -> Result<Self> {
        opts.validate()?;
        let mut rows = Vec::new();
        rows.try_reserve_exact(opts.initial_rows)
            .map_err(|_| RbError::OutOfMemory {
                requested_rows: opts.initial_rows,
            })?;
        Ok(Self {
            rows,
            table_capacity: opts.initial_rows,
            shift: opts.row_shift,
            mask: opts.row_width() - 1,
            max_rows: opts.max_rows,
            next: 0,
        })
    }

    /// Number of occupied slots, which is also the next index to be issued.
    #[inline]
    pub fn len(&self) -> usize {
        self.next
    }

    /// Returns true when no slot has been issued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.next == 0
    }

    /// Index the next [`push`](Self::push) will return.
    #[inline]
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Allocated slots across all rows, occupied or not.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.rows.len() << self.shift
    }

    /// Allocated row count.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Current capacity of the row table.
    #[inline]
    pub fn row_table_capacity(&self) -> usize {
        self.table_capacity
    }

    /// Slots per row.
    #[inline]
    pub fn row_width(&self) -> usize {
        self.mask + 1
    }

    /// Current row layout.
    pub fn shape(&self) -> StorageShape {
        StorageShape {
            rows: self.rows(),
            row_width: self.row_width(),
            row_table_capacity: self.table_capacity,
            capacity: self.capacity(),
            occupied: self.next,
        }
    }

    /// Makes room for one more slot.
    ///
    /// Allocates a new row when every allocated slot is taken, doubling the
    /// row table first if it is full. On error nothing observable changes.
    pub fn reserve(&mut self) -> Result<()> {
        if self.next > u32::MAX as usize {
            return Err(RbError::CapacityExceeded);
        }
        if self.next < self.capacity() {
            return Ok(());
        }
        let requested_rows = self.rows.len() + 1;
        if let Some(max) = self.max_rows {
            if requested_rows > max {
                warn!(rows = self.rows.len(), max_rows = max, "rows.limit_reached");
                return Err(RbError::OutOfMemory { requested_rows });
            }
        }

        let width = self.row_width();
        let mut row = Vec::new();
        row.try_reserve_exact(width)
            .map_err(|_| RbError::OutOfMemory { requested_rows })?;

        if self.rows.len() == self.table_capacity {
            let doubled = self.table_capacity * 2;
            self.rows
                .try_reserve_exact(doubled - self.rows.len())
                .map_err(|_| RbError::OutOfMemory {
                    requested_rows: doubled,
                })?;
            self.table_capacity = doubled;
            debug!(
                rows = self.rows.len(),
                table_capacity = doubled,
                "rows.grow_table"
            );
        }

        self.rows.push(row);
        debug!(
            rows = self.rows.len(),
            capacity = self.capacity(),
            "rows.alloc_row"
        );
        Ok(())
    }

    /// Writes `value` into the next free slot and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if no slot was made available by [`reserve`](Self::reserve).
    pub fn push(&mut self, value: T) -> u32 {
        assert!(
            self.next < self.capacity(),
            "RowStore::push called without a reserved slot"
        );
        let idx = self.next;
        let row = &mut self.rows[idx >> self.shift];
        debug_assert_eq!(row.len(), idx & self.mask);
        row.push(value);
        self.next += 1;
        idx as u32
    }

    /// Shared access to an occupied slot.
    #[inline]
    pub fn get(&self, idx: u32) -> Option<&T> {
        let idx = idx as usize;
        self.rows.get(idx >> self.shift)?.get(idx & self.mask)
    }

    /// Exclusive access to an occupied slot.
    #[inline]
    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        let idx = idx as usize;
        self.rows.get_mut(idx >> self.shift)?.get_mut(idx & self.mask)
    }

    /// Replaces the value in an occupied slot, returning the previous one.
    pub fn set(&mut self, idx: u32, value: T) -> T {
        mem::replace(&mut self[idx], value)
    }

    /// Iterates occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.rows.iter().flatten()
    }

    /// Consumes the store, yielding values in index order.
    pub fn into_values(self) -> impl Iterator<Item = T> {
        self.rows.into_iter().flatten()
    }
}

impl<T> Index<u32> for RowStore<T> {
    type Output = T;

    #[inline]
    fn index(&self, idx: u32) -> &T {
        let idx = idx as usize;
        &self.rows[idx >> self.shift][idx & self.mask]
    }
}

impl<T> IndexMut<u32> for RowStore<T> {
    #[inline]
    fn index_mut(&mut self, idx: u32) -> &mut T {
        let idx = idx as usize;
        &mut self.rows[idx >> self.shift][idx & self.mask]
    }
}
