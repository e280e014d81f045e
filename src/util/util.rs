/* SPDX-License-Identifier: MIT */

/// Generate set/get methods for a given struct field and type
#[macro_export]
macro_rules! funcs {
    ($name: ident, $T: ty) => {
        paste::paste! {
            pub fn [<$name>](&self) -> $T {
                self.$name
            }
            pub fn [<set_ $name>](&mut self, value: $T) {
                self.$name = value;
            }
        }
    };
}

/// Generate get method for a given struct field and type
#[macro_export]
macro_rules! getter_func {
    ($name: ident, $T: ty) => {
        paste::paste! {
            pub fn [<$name>](&self) -> $T {
                self.$name
            }
        }
    };
}

/// Obtain bit for a given position
#[macro_export]
macro_rules! BIT {
    ($x: expr) => {
        (1 << ($x))
    };
}

/// Retrieve 32 least significant bits
#[macro_export]
macro_rules! LOWER_32BITS {
    ($x: expr) => {
        (($x) as u32 & 0xffffffff)
    };
}

/// Retrieve 32 most significant bits
#[macro_export]
macro_rules! UPPER_32BITS {
    ($x: expr) => {
        (($x >> 32) as u32 & 0xffffffff)
    };
}

