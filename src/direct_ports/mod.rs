//! Direct Ports
//! 
//! This module contains direct ports of C or other code to rust.
//! Direct ports are probably under the same license as the original software.
//! See the individual modules herein for specifics.
//! 
//! We will try to provide equivalent programs under MIT license in each case.

pub mod comp;