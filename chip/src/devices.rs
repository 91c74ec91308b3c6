//! The host facing capabilities and the keypad model of the chip.
use hashbrown::HashMap;

use crate::{definitions::keyboard, KeyMapError};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will display all from the pixels, row major with
    /// [`WIDTH`](crate::definitions::display::WIDTH) pixels per row.
    fn display(&mut self, pixels: &[bool]);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keyboard data from the host
pub trait KeyboardCommands {
    /// Returns which of the 16 keypad symbols are currently held.
    fn get_keyboard(&mut self) -> [bool; keyboard::SIZE];
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the lifetime of the run
pub trait HostCommands {
    /// Will be checked before every instruction, once it returns
    /// true the execution stops.
    fn should_stop(&mut self) -> bool;
}

/// Will store the last press of the given keyboard
/// and represent the internal keyboard as well
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
    /// The latest press transition that was not yet consumed
    press: Option<u8>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    /// Sets a single key, recording a press if it was released before.
    pub fn set_key(&mut self, key: u8, to: bool) {
        let index = key as usize % keyboard::SIZE;
        if !self.keys[index] && to {
            self.press = Some(index as u8);
        }
        self.keys[index] = to;
    }

    /// Replaces the held state of all keys, every released to held
    /// transition counts as a press. If multiple keys went down at once
    /// the highest symbol wins.
    pub fn set_mult(&mut self, keys: &[bool; keyboard::SIZE]) {
        for (index, &to) in keys.iter().enumerate() {
            self.set_key(index as u8, to);
        }
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }

    /// Whether the given symbol (taken modulo 16) is held down.
    pub fn is_held(&self, key: u8) -> bool {
        self.keys[key as usize % keyboard::SIZE]
    }

    /// Consumes the pending press.
    pub fn take_press(&mut self) -> Option<u8> {
        self.press.take()
    }

    pub fn clear_press(&mut self) {
        self.press = None;
    }
}

/// A bijection between the 16 keypad symbols and the characters the host reports.
#[derive(Debug, Clone)]
pub struct KeyMap {
    keys: [char; keyboard::SIZE],
    symbols: HashMap<char, u8>,
}

impl KeyMap {
    /// Creates a key map where `keys[symbol]` is the host key of the symbol.
    pub fn new(keys: [char; keyboard::SIZE]) -> Result<Self, KeyMapError> {
        let mut symbols = HashMap::with_capacity(keyboard::SIZE);
        for (symbol, key) in keys.iter().enumerate() {
            let key = key.to_ascii_lowercase();
            if let Some(first) = symbols.insert(key, symbol as u8) {
                return Err(KeyMapError::Duplicate {
                    key,
                    first,
                    second: symbol as u8,
                });
            }
        }
        Ok(Self { keys, symbols })
    }

    /// Binds every symbol to the character `'0' + symbol`.
    ///
    /// # Example
    /// ```rust
    /// # use chip::devices::KeyMap;
    /// let map = KeyMap::ascii();
    /// assert_eq!(map.symbol('0'), Some(0x0));
    /// assert_eq!(map.symbol('?'), Some(0xF));
    /// ```
    pub fn ascii() -> Self {
        let mut keys = ['\0'; keyboard::SIZE];
        for (symbol, key) in keys.iter_mut().enumerate() {
            *key = (symbol as u8 + keyboard::ASCII_OFFSET) as char;
        }
        Self::from_unique(keys)
    }

    /// The conventional binding, the left hand side of a qwerty
    /// keyboard mirrors the [`LAYOUT`](keyboard::LAYOUT) of the keypad.
    pub fn qwerty() -> Self {
        let mut keys = ['\0'; keyboard::SIZE];
        for (row, host) in keyboard::LAYOUT.iter().zip(keyboard::QWERTY.iter()) {
            for (&symbol, &key) in row.iter().zip(host.iter()) {
                keys[symbol as usize] = key;
            }
        }
        Self::from_unique(keys)
    }

    fn from_unique(keys: [char; keyboard::SIZE]) -> Self {
        let symbols = keys
            .iter()
            .enumerate()
            .map(|(symbol, key)| (*key, symbol as u8))
            .collect();
        Self { keys, symbols }
    }

    /// The symbol bound to the given host key.
    pub fn symbol(&self, key: char) -> Option<u8> {
        self.symbols.get(&key.to_ascii_lowercase()).copied()
    }

    /// The host key bound to the given symbol.
    pub fn host_key(&self, symbol: u8) -> Option<char> {
        self.keys.get(symbol as usize).copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::qwerty()
    }
}
