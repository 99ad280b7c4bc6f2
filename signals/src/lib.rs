/*!
A synchronous signal/slot callback registry for ankurah

# Design requirements:
- Slots are called on the emitting thread, in connection order
- A slot's connection is a handle that can remove exactly that slot, no matter what was connected or removed since
- Scoped connections remove their slot when dropped
- The concurrency mode is chosen by type, never at run time: no locking, concurrent emits, or serialized emits
- Slot results can be collected lazily, one slot per `next()`
- A slot may connect or disconnect slots of the signal that is calling it without deadlocking

# Nomenclature:
- signal - the registry. Owns its slots
- slot - a callable connected to a signal
- connection - a handle which disconnects one slot. Dropping it does nothing
- scoped connection - a connection which disconnects when dropped
- emit - call every slot with the given arguments
- emission - a lazy emit; an iterator over slot results

# Basic usage

```rust
use ankurah_slots::*;

let signal: Signal<i32> = Signal::new();
let mut connection = signal.connect(|value: &i32| println!("first: {value}"));
{
    let _scoped = signal.scoped_connect(|value: &i32| println!("second: {value}"));
    signal.emit(1);
    // Should print:
    // first: 1
    // second: 1
}
connection.disconnect();
signal.emit(2); // prints nothing
```

# Collecting results

```rust
use ankurah_slots::*;

let signal: UnsyncSignal<(i32, i32), i32> = UnsyncSignal::new();
let _sum = signal.connect(|(a, b): &(i32, i32)| a + b);
let _product = signal.connect(|(a, b): &(i32, i32)| a * b);

let results: Vec<i32> = signal.emit_iterate((3, 4)).collect();
assert_eq!(results, vec![7, 12]);
```
*/

mod connection;
mod context;
mod emission;
mod error;
mod lock;
mod policy;
mod registry;
mod signal;
mod slot;

pub use connection::*;
pub use emission::*;
pub use error::*;
pub use lock::*;
pub use policy::*;
pub use signal::*;
pub use slot::*;
