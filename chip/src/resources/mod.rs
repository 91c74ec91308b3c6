use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use crate::{definitions::cpu, LoadError};

#[derive(Clone, Debug)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The program, guaranteed to fit into the program region of the memory
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    ///
    /// # Example
    /// ```rust
    /// # use chip::{resources::Rom, LoadError};
    /// let rom = Rom::new("PONG", vec![0x00, 0xE0]).unwrap();
    /// assert_eq!(rom.get_data(), &[0x00, 0xE0]);
    ///
    /// let err = Rom::new("HUGE", vec![0; 3585]).unwrap_err();
    /// assert!(matches!(err, LoadError::ProgramTooLarge { size: 3585, max: 3584 }));
    /// ```
    pub fn new<D: Into<Box<[u8]>>>(name: &str, data: D) -> Result<Self, LoadError> {
        let data = data.into();
        check_size(data.len())?;
        Ok(Rom {
            name: name.to_string(),
            data,
        })
    }

    /// Will read the rom from the file system, the size is checked before
    /// anything is read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let name = path.display().to_string();

        let read_err = |source: io::Error| LoadError::Read {
            name: name.clone(),
            source,
        };

        let mut file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(name.clone()),
            _ => read_err(err),
        })?;

        let metadata = file.metadata().map_err(read_err)?;
        if !metadata.is_file() {
            return Err(read_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        let size = metadata.len() as usize;
        check_size(size)?;

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| LoadError::Allocation(size))?;
        file.read_to_end(&mut data).map_err(read_err)?;
        // the file might have grown since the size check
        check_size(data.len())?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or(name);
        log::info!("read rom '{}' from {}", name, path.display());

        Ok(Rom {
            name,
            data: data.into_boxed_slice(),
        })
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

fn check_size(size: usize) -> Result<(), LoadError> {
    if size > cpu::MAX_PROGRAM_SIZE {
        Err(LoadError::ProgramTooLarge {
            size,
            max: cpu::MAX_PROGRAM_SIZE,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::*;

    fn temp_rom(name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("chip8-vm-{}-{}.ch8", process::id(), name));
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_from_file() {
        let path = temp_rom("ok", &[0x60, 0x01, 0x12, 0x02]);
        let rom = Rom::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(&[0x60, 0x01, 0x12, 0x02], rom.get_data());
        assert!(rom.get_name().ends_with("-ok"));
    }

    #[test]
    fn test_from_file_too_large() {
        let path = temp_rom("large", &[0; cpu::MAX_PROGRAM_SIZE + 1]);
        let res = Rom::from_file(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(
            res,
            Err(LoadError::ProgramTooLarge {
                size,
                max: cpu::MAX_PROGRAM_SIZE
            }) if size == cpu::MAX_PROGRAM_SIZE + 1
        ));
    }

    #[test]
    fn test_from_file_exactly_fits() {
        let path = temp_rom("fits", &[0xAA; cpu::MAX_PROGRAM_SIZE]);
        let res = Rom::from_file(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(cpu::MAX_PROGRAM_SIZE, res.unwrap().get_data().len());
    }

    #[test]
    fn test_from_file_directory() {
        let path = env::temp_dir();
        let err = Rom::from_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }), "{:?}", err);
    }

    #[test]
    fn test_from_file_missing() {
        let path = env::temp_dir().join("chip8-vm-this-rom-does-not-exist.ch8");
        assert!(matches!(Rom::from_file(&path), Err(LoadError::NotFound(_))));
    }
}
