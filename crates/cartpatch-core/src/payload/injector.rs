use strum::Display;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::options::PatchMode;
use crate::pattern::{Pattern, find, find_all};
use crate::report::{PatchLocation, PatchReport};
use crate::rom::{
    ByteBuffer, cartridge, find_free_block, header, irq, pad_to_alignment, rom_address,
};

use super::Payload;
use super::hooks::scan_write_hooks;
use super::layout::{DEFAULT_SAVE_SIZE, PayloadField, SIGNATURE, SIGNATURE_STRIDE};

/// Largest word offset a forward ARM branch can encode
const MAX_FORWARD_BRANCH: u32 = 0x7F_FFFF;

/// Progress of one injection, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum InjectorStage {
    Loaded,
    Validated,
    IrqPatched,
    PayloadPlaced,
    EntrypointRewired,
    WriteHooksPatched,
    Persisted,
}

/// Installs a batteryless save payload into one ROM image.
///
/// The injector owns the image while it works. [`PayloadInjector::run`] hands
/// it back only once every stage has succeeded; on failure the image is
/// dropped with the error, so nothing half-patched can leak to the caller.
pub struct PayloadInjector<'p> {
    rom: ByteBuffer,
    payload: &'p Payload,
    mode: PatchMode,
    stage: InjectorStage,
    base: usize,
    report: PatchReport,
}

impl<'p> PayloadInjector<'p> {
    /// Take ownership of `rom`, padding a trimmed image back to a bank boundary.
    pub fn new(mut rom: ByteBuffer, payload: &'p Payload, mode: PatchMode) -> Result<Self> {
        if rom.len() > cartridge::MAX_ROM_SIZE {
            return Err(Error::RomTooLarge {
                size: rom.len(),
                max: cartridge::MAX_ROM_SIZE,
            });
        }

        let mut report = PatchReport::new("batteryless");
        if pad_to_alignment(&mut rom, cartridge::BANK_SIZE, cartridge::PADDING_BYTE) {
            warn!("ROM has been trimmed and is misaligned. Padding to 256KB alignment");
            report.warn(format!("ROM padded to 0x{:X} bytes", rom.len()));
        }

        Ok(Self {
            rom,
            payload,
            mode,
            stage: InjectorStage::Loaded,
            base: 0,
            report,
        })
    }

    pub fn stage(&self) -> InjectorStage {
        self.stage
    }

    /// Run every stage and return the patched image with its report.
    pub fn run(mut self) -> Result<(ByteBuffer, PatchReport)> {
        if let Err(e) = self.advance() {
            warn!(
                "Payload injection stopped after stage {}: {}",
                self.stage, e
            );
            return Err(e);
        }
        self.stage = InjectorStage::Persisted;
        self.report.rom_size = self.rom.len();
        Ok((self.rom, self.report))
    }

    fn advance(&mut self) -> Result<()> {
        self.check_signature()?;
        self.enter(InjectorStage::Validated);
        self.patch_irq_references()?;
        self.enter(InjectorStage::IrqPatched);
        self.place_payload()?;
        self.enter(InjectorStage::PayloadPlaced);
        self.rewire_entrypoint()?;
        self.enter(InjectorStage::EntrypointRewired);
        self.patch_write_hooks()?;
        self.enter(InjectorStage::WriteHooksPatched);
        Ok(())
    }

    fn enter(&mut self, stage: InjectorStage) {
        debug!("Injector stage: {}", stage);
        self.stage = stage;
    }

    fn check_signature(&self) -> Result<()> {
        let marker = Pattern::exact(SIGNATURE)?;
        if find(self.rom.as_slice(), &marker, 0, SIGNATURE_STRIDE)?.found {
            return Err(Error::AlreadyPatched);
        }
        Ok(())
    }

    fn patch_irq_references(&mut self) -> Result<()> {
        let legacy = Pattern::exact(&irq::LEGACY_HANDLER_ADDR)?;
        let hits = find_all(self.rom.as_slice(), &legacy, irq::SCAN_STRIDE)?;
        if hits.is_empty() {
            return Err(Error::PatternNotFound("IRQ handler reference".to_string()));
        }
        for offset in hits {
            self.rom.write(offset, &irq::PATCHED_HANDLER_ADDR)?;
            debug!("IRQ handler reference at 0x{:X}", offset);
            self.report.record(PatchLocation::found("IRQ handler", offset));
        }
        Ok(())
    }

    fn place_payload(&mut self) -> Result<()> {
        let block = cartridge::BANK_SIZE + self.payload.len();
        let base = match find_free_block(self.rom.as_slice(), block, cartridge::BANK_SIZE) {
            Some(base) => base,
            None => {
                let size = self.rom.len();
                let grown = size + cartridge::EXPANSION_SIZE;
                if grown > cartridge::MAX_ROM_SIZE {
                    return Err(Error::RomFull { size });
                }
                info!(
                    "No free bank for the payload; expanding ROM to 0x{:X}",
                    grown
                );
                self.rom.resize(grown, cartridge::PADDING_BYTE);
                grown - block
            }
        };

        self.rom.write(base, self.payload.as_bytes())?;
        let flush_at = base + PayloadField::FlushMode.offset();
        self.rom.write_u32_le(flush_at, self.mode.flush_flag())?;
        info!(
            "Payload installed at 0x{:X}, save data at 0x{:X}",
            base, base + self.payload.len()
        );

        self.base = base;
        self.report.payload_offset = Some(base);
        Ok(())
    }

    /// CPU address of `offset` bytes into the installed payload
    fn payload_address(&self, offset: u32) -> Result<u32> {
        rom_address(self.base)
            .and_then(|address| address.checked_add(offset))
            .ok_or_else(|| Error::InvalidPayload(format!("offset {:#x} out of range", offset)))
    }

    fn rewire_entrypoint(&mut self) -> Result<()> {
        let word = self.rom.read_u32_le(header::ENTRYPOINT)?;
        if (word >> 24) as u8 != header::BRANCH_OPCODE {
            return Err(Error::UnexpectedEntrypoint(word));
        }

        let pipeline = cartridge::ROM_BASE + header::BRANCH_PIPELINE;
        let original = pipeline + (self.rom.read_u24_le(header::ENTRYPOINT)? << 2);
        self.rom.write_u32_le(
            self.base + PayloadField::OriginalEntrypoint.offset(),
            original,
        )?;

        let target = self.payload_address(self.payload.field(PayloadField::PatchedEntrypoint)?)?;
        let displacement = target.checked_sub(pipeline).ok_or_else(|| {
            Error::InvalidPayload(format!("entrypoint 0x{:08X} precedes the header", target))
        })?;
        if displacement % 4 != 0 || displacement >> 2 > MAX_FORWARD_BRANCH {
            return Err(Error::InvalidPayload(format!(
                "entrypoint 0x{:08X} is not reachable with a branch",
                target
            )));
        }
        let branch = (u32::from(header::BRANCH_OPCODE) << 24) | (displacement >> 2);
        self.rom.write_u32_le(header::ENTRYPOINT, branch)?;

        info!("Entrypoint rewired: 0x{:08X} -> 0x{:08X}", original, target);
        self.report
            .record(PatchLocation::found("entrypoint", header::ENTRYPOINT));
        Ok(())
    }

    fn patch_write_hooks(&mut self) -> Result<()> {
        let save_size_at = self.base + PayloadField::SaveSize.offset();
        let mut save_size = None;

        for found in scan_write_hooks(self.rom.as_slice())? {
            let hook = found.hook;
            let address = self.payload_address(self.payload.field(hook.target)?)?;
            hook.thunk.install(&mut self.rom, found.offset, address)?;
            self.rom.write_u32_le(save_size_at, hook.save_size)?;
            info!(
                "{}: hooked at 0x{:X}, save size 0x{:X}",
                hook.name, found.offset, hook.save_size
            );
            self.report.record(PatchLocation::found(hook.name, found.offset));
            save_size = Some(hook.save_size);
        }

        if save_size.is_none() {
            if self.mode.is_strict() {
                return Err(Error::NoWriteHookFound);
            }
            warn!("Unsure what save type this is. Defaulting to 128KB save");
            self.report
                .warn("No write routine found; defaulting to 128KB save");
            self.rom.write_u32_le(save_size_at, DEFAULT_SAVE_SIZE)?;
            save_size = Some(DEFAULT_SAVE_SIZE);
        }

        self.report.save_size = save_size;
        Ok(())
    }
}

/// List the write routines the injector would hook, without touching the image.
pub fn detect_write_hooks(rom: &[u8]) -> Result<Vec<PatchLocation>> {
    Ok(scan_write_hooks(rom)?
        .into_iter()
        .map(|found| PatchLocation::found(found.hook.name, found.offset))
        .collect())
}
