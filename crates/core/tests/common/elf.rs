//! Minimal ELF32 little-endian executable builder.
//!
//! Produces a file with a null section, the requested `PROGBITS` sections and a
//! `.shstrtab`, and no program headers. That is all the section reader looks at.

/// `EM_RISCV`.
pub const EM_RISCV: u16 = 243;

const EHDR_SIZE: usize = 52;
const SHDR_SIZE: usize = 40;
const SHT_PROGBITS: u32 = 1;
const SHT_STRTAB: u32 = 3;
const SHF_WRITE: u32 = 0x1;
const SHF_ALLOC: u32 = 0x2;
const SHF_EXECINSTR: u32 = 0x4;

/// Builder for a test executable.
#[derive(Debug, Clone)]
pub struct ElfBuilder {
    machine: u16,
    entry: u32,
    sections: Vec<(String, u32, Vec<u8>)>,
}

impl ElfBuilder {
    /// A RISC-V executable entering at `entry`, with no sections yet.
    pub fn new(entry: u32) -> Self {
        Self {
            machine: EM_RISCV,
            entry,
            sections: Vec::new(),
        }
    }

    /// Overrides `e_machine`.
    pub fn machine(mut self, machine: u16) -> Self {
        self.machine = machine;
        self
    }

    /// Adds a section named `name` loaded at `address`.
    pub fn section(mut self, name: &str, address: u32, bytes: &[u8]) -> Self {
        self.sections.push((name.to_owned(), address, bytes.to_vec()));
        self
    }

    /// Serializes the executable.
    pub fn build(&self) -> Vec<u8> {
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for (name, _, _) in &self.sections {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(name.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_name = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");

        let mut body = Vec::new();
        let mut data_offsets = Vec::new();
        for (_, _, bytes) in &self.sections {
            data_offsets.push((EHDR_SIZE + body.len()) as u32);
            body.extend_from_slice(bytes);
        }
        let shstrtab_offset = (EHDR_SIZE + body.len()) as u32;
        body.extend_from_slice(&shstrtab);
        while (EHDR_SIZE + body.len()) % 4 != 0 {
            body.push(0);
        }
        let shoff = (EHDR_SIZE + body.len()) as u32;
        let shnum = (self.sections.len() + 2) as u16;

        let mut out = Vec::new();
        out.extend_from_slice(&[0x7f, b'E', b'L', b'F', 1, 1, 1, 0]);
        out.extend_from_slice(&[0; 8]);
        put16(&mut out, 2); // ET_EXEC
        put16(&mut out, self.machine);
        put32(&mut out, 1);
        put32(&mut out, self.entry);
        put32(&mut out, 0); // e_phoff
        put32(&mut out, shoff);
        put32(&mut out, 0); // e_flags
        put16(&mut out, EHDR_SIZE as u16);
        put16(&mut out, 32);
        put16(&mut out, 0); // e_phnum
        put16(&mut out, SHDR_SIZE as u16);
        put16(&mut out, shnum);
        put16(&mut out, shnum - 1);
        assert_eq!(out.len(), EHDR_SIZE);

        out.extend_from_slice(&body);

        out.extend_from_slice(&[0; SHDR_SIZE]);
        for (i, (name, address, bytes)) in self.sections.iter().enumerate() {
            let flags = if name == ".text" {
                SHF_ALLOC | SHF_EXECINSTR
            } else {
                SHF_ALLOC | SHF_WRITE
            };
            put_shdr(
                &mut out,
                [name_offsets[i], SHT_PROGBITS, flags, *address, data_offsets[i], bytes.len() as u32, 0, 0, 4, 0],
            );
        }
        put_shdr(
            &mut out,
            [shstrtab_name, SHT_STRTAB, 0, 0, shstrtab_offset, shstrtab.len() as u32, 0, 0, 1, 0],
        );
        out
    }
}

fn put16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_shdr(out: &mut Vec<u8>, fields: [u32; 10]) {
    for field in fields {
        put32(out, field);
    }
}

/// A RISC-V executable with `.text` at `0x1_0000` (two instructions) and `.data` at
/// `0x1_1000` (`"rv32mem!"`), entering at `0x1_0000`.
pub fn sample_program() -> Vec<u8> {
    ElfBuilder::new(0x1_0000)
        .section(".text", 0x1_0000, &SAMPLE_TEXT)
        .section(".data", 0x1_1000, SAMPLE_DATA)
        .build()
}

/// `addi x0, x0, 0; jal x0, 0`.
pub const SAMPLE_TEXT: [u8; 8] = [0x13, 0x00, 0x00, 0x00, 0x6f, 0x00, 0x00, 0x00];

/// Contents of the sample `.data` section.
pub const SAMPLE_DATA: &[u8] = b"rv32mem!";
